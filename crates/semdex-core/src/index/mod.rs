//! Indexing pipeline
//!
//! Tracked-file enumeration, path filtering, line chunking, and the
//! orchestrator that embeds and stores chunks.

mod chunker;
mod filter;
mod indexer;
mod reconcile;
mod tracked;

pub use chunker::*;
pub use filter::PathFilter;
pub use indexer::*;
pub use reconcile::Reconciler;
pub use tracked::*;
