//! Vector encoding and similarity
//!
//! Stores embeddings as BLOBs and computes similarity in Rust.

/// Convert f32 embedding to bytes (little-endian)
pub fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Convert bytes to f32 embedding
pub fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Dot product of two vectors of equal length.
///
/// For L2-normalized embeddings this is the cosine similarity. Mismatched
/// lengths score 0.0; callers are expected to reject them earlier.
pub fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Scale `v` to unit length in place. Zero vectors are left untouched.
pub fn l2_normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_bytes_layout() {
        let bytes = embedding_to_bytes(&[1.0f32, -2.5]);
        assert_eq!(bytes.len(), 8);
        assert_eq!(&bytes[..4], &1.0f32.to_le_bytes());
        assert_eq!(bytes_to_embedding(&bytes), vec![1.0, -2.5]);
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        let mut bytes = embedding_to_bytes(&[0.5f32]);
        bytes.push(0xff);
        assert_eq!(bytes_to_embedding(&bytes), vec![0.5]);
    }

    #[test]
    fn test_dot_product_normalized_identical() {
        let mut a = vec![3.0, 4.0, 0.0];
        l2_normalize(&mut a);
        let sim = dot_product(&a, &a);
        assert!((sim - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_dot_product_orthogonal() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        assert!(dot_product(&a, &b).abs() < 0.0001);
    }

    #[test]
    fn test_dot_product_length_mismatch() {
        assert_eq!(dot_product(&[1.0, 0.0], &[1.0]), 0.0);
    }

    #[test]
    fn test_normalize_zero_vector() {
        let mut v = vec![0.0, 0.0];
        l2_normalize(&mut v);
        assert_eq!(v, vec![0.0, 0.0]);
    }
}
