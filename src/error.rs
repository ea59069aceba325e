use std::fmt;

/// Pattern compilation error
///
/// Returned by [`crate::pattern::compile`] when a path pattern cannot be
/// turned into a matcher by either the native primitive or the regex fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// A `{` group was opened without a matching `}` (or vice versa)
    UnbalancedGroup {
        /// The offending pattern
        pattern: String,
    },
    /// A `:` was not followed by a valid parameter name
    InvalidParamName {
        /// The offending pattern
        pattern: String,
        /// Byte offset of the `:`
        position: usize,
    },
    /// The same parameter name appears twice
    DuplicateParam {
        /// The repeated name
        name: String,
    },
    /// A `:name(...)` constraint is unterminated or the generated regex is invalid
    InvalidRegex {
        /// The offending pattern
        pattern: String,
        /// Underlying regex error text
        reason: String,
    },
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternError::UnbalancedGroup { pattern } => {
                write!(f, "unbalanced optional group in pattern '{}'", pattern)
            }
            PatternError::InvalidParamName { pattern, position } => {
                write!(
                    f,
                    "invalid parameter name at offset {} in pattern '{}'",
                    position, pattern
                )
            }
            PatternError::DuplicateParam { name } => {
                write!(f, "duplicate parameter name ':{}'", name)
            }
            PatternError::InvalidRegex { pattern, reason } => {
                write!(f, "pattern '{}' does not compile: {}", pattern, reason)
            }
        }
    }
}

impl std::error::Error for PatternError {}

/// Failure reported by a host navigation backend
///
/// Covers both a traversal call that fails immediately and a deferred commit
/// signal that rejects. Navigation operations absorb these into logger
/// `error` calls; they never reach the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The backend call itself failed
    Call {
        /// Name of the backend operation (e.g. `navigate`, `traverse_to`)
        operation: &'static str,
        /// Backend-provided message
        message: String,
    },
    /// The deferred commit result was rejected
    Rejected {
        /// Backend-provided message
        message: String,
    },
}

impl BackendError {
    /// Shorthand for a failed call
    pub fn call(operation: &'static str, message: impl Into<String>) -> Self {
        BackendError::Call {
            operation,
            message: message.into(),
        }
    }

    /// Shorthand for a rejected commit
    pub fn rejected(message: impl Into<String>) -> Self {
        BackendError::Rejected {
            message: message.into(),
        }
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Call { operation, message } => {
                write!(f, "backend {} failed: {}", operation, message)
            }
            BackendError::Rejected { message } => {
                write!(f, "navigation commit rejected: {}", message)
            }
        }
    }
}

impl std::error::Error for BackendError {}
