use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single frontmatter extraction attempt.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid notes file: fewer than two `---` delimiter lines")]
    InvalidNotesFile,

    #[error("invalid YAML frontmatter: {0}")]
    InvalidYaml(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failure of an index pass.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("not a regular file: {0}")]
    NotAFile(PathBuf),

    #[error("invalid note name: {0:?}")]
    InvalidName(String),

    #[error("extraction failed for {path} after {attempts} attempts: {source}")]
    RetryExhausted {
        path: PathBuf,
        attempts: u32,
        #[source]
        source: ExtractError,
    },

    #[error(transparent)]
    Store(#[from] storage::StoreError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type IndexResult<T> = Result<T, IndexError>;
