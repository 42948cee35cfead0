//! Error types for the memoizer.

/// Memoization errors.
#[derive(Debug, thiserror::Error)]
pub enum MemoError {
    /// More positional values than declared parameters.
    #[error("too many positional arguments: {given} given, {declared} declared")]
    TooManyPositional { given: usize, declared: usize },

    /// Keyword argument that names no declared parameter.
    #[error("unknown keyword argument: {name}")]
    UnknownKeyword { name: String },

    /// Parameter bound both positionally and by keyword.
    #[error("multiple values for argument: {name}")]
    DuplicateArgument { name: String },

    /// Declared parameter left unbound with no default to substitute.
    #[error("missing required argument: {name}")]
    MissingArgument { name: String },

    /// Store failure. Propagated unchanged: no retry, no fallback to
    /// uncached execution at this layer.
    #[error("store error: {message}")]
    Store { message: String },

    /// Wrapped-function failure. Propagated unchanged and never cached.
    #[error(transparent)]
    Compute(#[from] anyhow::Error),
}

impl MemoError {
    /// Build a store error from any displayable cause.
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Whether the error came from argument binding rather than from the
    /// store or the wrapped function.
    pub fn is_binding(&self) -> bool {
        matches!(
            self,
            Self::TooManyPositional { .. }
                | Self::UnknownKeyword { .. }
                | Self::DuplicateArgument { .. }
                | Self::MissingArgument { .. }
        )
    }
}

/// Result type for memoizer operations.
pub type MemoResult<T> = Result<T, MemoError>;
