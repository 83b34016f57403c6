use thiserror::Error;

/// Errors produced by node tree operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NodeError {
    /// A child with the same name already exists under the parent.
    #[error("duplicate child {name:?} under {parent:?}")]
    DuplicateChild { parent: String, name: String },
}

/// Convenience alias for node results.
pub type NodeResult<T> = Result<T, NodeError>;
