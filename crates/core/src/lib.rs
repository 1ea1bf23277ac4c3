//! Core library: frontmatter extraction, staleness checks and index passes.

pub mod config;
pub mod error;
pub mod extractor;
pub mod indexer;
pub mod pipeline;
pub mod retry;
pub mod scanner;

pub use error::{ExtractError, IndexError, IndexResult};
pub use storage::{Index, IndexEntry, IndexStore, Metadata};
