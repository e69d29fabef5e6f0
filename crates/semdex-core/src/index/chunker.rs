//! Line-window chunking for embedding

/// Lines per chunk unless configured otherwise
pub const CHUNK_SIZE_LINES: usize = 30;

/// Windows whose trimmed text is shorter than this (in characters) are dropped
pub const MIN_CHUNK_CHARS: usize = 10;

/// Contiguous line range of a file, before embedding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineChunk {
    /// Position among the kept chunks of the file, starting at 0
    pub chunk_index: usize,
    /// First line, 1-based
    pub start_line: usize,
    /// Last line, 1-based and inclusive
    pub end_line: usize,
    /// Trimmed window text
    pub text: String,
}

/// Split `content` into non-overlapping windows of `chunk_size` lines.
///
/// The last window may be shorter. Windows with less than
/// [`MIN_CHUNK_CHARS`] characters after trimming are dropped and do not
/// consume a chunk index, so line coverage may have gaps.
pub fn chunk_by_lines(content: &str, chunk_size: usize) -> Vec<LineChunk> {
    let chunk_size = chunk_size.max(1);
    let lines: Vec<&str> = content.lines().collect();

    let mut chunks = Vec::new();
    for (window_idx, window) in lines.chunks(chunk_size).enumerate() {
        let text = window.join("\n");
        let trimmed = text.trim();
        if trimmed.chars().count() < MIN_CHUNK_CHARS {
            continue;
        }

        let start_line = window_idx * chunk_size + 1;
        chunks.push(LineChunk {
            chunk_index: chunks.len(),
            start_line,
            end_line: start_line + window.len() - 1,
            text: trimmed.to_string(),
        });
    }

    chunks
}
