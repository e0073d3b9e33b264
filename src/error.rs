//! Error types for FALL.

use std::fmt;

/// Unified error type for all FALL operations.
///
/// Lexical and syntax errors are fatal to a whole program run; every other
/// kind is local to the statement or proof step that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum FallError {
    /// Malformed construction with field context
    Validation { field: String, message: String },
    /// Unrecognized input during tokenization
    Lexical { line: usize, column: usize, message: String },
    /// Grammar violation during parsing
    Syntax { line: usize, column: usize, found: String, expected: String },
    /// Reference to a name that was never defined
    UnknownReference { name: String },
    /// Attempt to redefine an already-registered name
    Redefinition { name: String },
    /// Operand count does not match operator arity (construction-time only)
    ArityMismatch { operator: String, expected: String, actual: usize },
    /// Atomic proposition evaluated without a truth value or context binding
    UnboundSymbol { symbol: String },
    /// INFER step with a missing premise or a failed pattern slot
    UnjustifiedInference { step: u32, detail: String },
    /// Validation pipeline rejection under the active framework
    FrameworkIncompatible { framework: String, violations: Vec<String> },
    /// Collaborator call exceeded its time budget
    Timeout { operation: String, limit_secs: f64 },
    /// Name resolves to multiple distinct registered entities
    AmbiguousQuery { name: String },
    /// Resource limit exceeded
    ResourceLimit { resource: String, limit: usize, actual: usize },
    /// Serialization error
    Serialization { message: String },
}

impl fmt::Display for FallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation { field, message } => {
                write!(f, "validation error on '{}': {}", field, message)
            }
            Self::Lexical { line, column, message } => {
                write!(f, "lexical error at {}:{}: {}", line, column, message)
            }
            Self::Syntax { line, column, found, expected } => {
                write!(
                    f,
                    "syntax error at {}:{}: expected {}, found '{}'",
                    line, column, expected, found
                )
            }
            Self::UnknownReference { name } => {
                write!(f, "unknown reference: '{}'", name)
            }
            Self::Redefinition { name } => {
                write!(f, "'{}' is already defined", name)
            }
            Self::ArityMismatch { operator, expected, actual } => {
                write!(
                    f,
                    "operator {} expects {} operand(s), got {}",
                    operator, expected, actual
                )
            }
            Self::UnboundSymbol { symbol } => {
                write!(f, "no truth value available for '{}'", symbol)
            }
            Self::UnjustifiedInference { step, detail } => {
                write!(f, "unjustified inference at step {}: {}", step, detail)
            }
            Self::FrameworkIncompatible { framework, violations } => {
                write!(
                    f,
                    "rejected by framework '{}': {}",
                    framework,
                    violations.join("; ")
                )
            }
            Self::Timeout { operation, limit_secs } => {
                write!(f, "{} timed out after {}s", operation, limit_secs)
            }
            Self::AmbiguousQuery { name } => {
                write!(f, "'{}' resolves to multiple registered entities", name)
            }
            Self::ResourceLimit { resource, limit, actual } => {
                write!(f, "{} limit exceeded: {} > {}", resource, actual, limit)
            }
            Self::Serialization { message } => {
                write!(f, "serialization error: {}", message)
            }
        }
    }
}

impl std::error::Error for FallError {}

/// Result type alias for FALL operations.
pub type FallResult<T> = Result<T, FallError>;

impl From<serde_json::Error> for FallError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization { message: e.to_string() }
    }
}

impl FallError {
    /// Whether this error aborts the whole program run rather than a single
    /// statement.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Lexical { .. } | Self::Syntax { .. })
    }
}
