use std::io;

use thiserror::Error;

/// Error type for dataset validation, parsing, configuration, and IO failures.
#[derive(Debug, Error)]
pub enum SplitError {
    #[error("inconsistent dataset: user {user} has {actual} records but {expected} were recorded")]
    InconsistentDataset {
        user: usize,
        expected: usize,
        actual: usize,
    },
    #[error("{kind} id {id} is not present in the dictionary")]
    MissingLabel { kind: &'static str, id: usize },
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("malformed sample line {line}: {reason}")]
    Parse { line: usize, reason: String },
    #[error(transparent)]
    Io(#[from] io::Error),
}
