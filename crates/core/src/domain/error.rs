// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Requested permutation length {requested} exceeds limit {max}")]
    PermutationLength { requested: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, DomainError>;
