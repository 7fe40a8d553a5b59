use thiserror::Error;

/// Result type for extractor operations
pub type Result<T> = std::result::Result<T, ExtractorError>;

/// Errors from parsing one CPP condition expression.
///
/// These are recoverable: depending on
/// [`InvalidConditionHandling`](crate::InvalidConditionHandling) the caller
/// either aborts the file or substitutes a placeholder condition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpressionError {
    #[error("unexpected character '{0}' in expression")]
    UnexpectedCharacter(char),

    #[error("unsupported operator '{0}'")]
    UnsupportedOperator(String),

    #[error("expected an operand, found '{0}'")]
    ExpectedOperand(String),

    /// The expression ended where an operand was still required.
    #[error("expression ends with a dangling operator")]
    DanglingOperator,

    #[error("unbalanced parentheses")]
    UnbalancedParentheses,

    #[error("expected ')', found '{0}'")]
    ExpectedClosingParenthesis(String),

    #[error("unexpected trailing '{0}'")]
    TrailingInput(String),

    #[error("invalid integer literal '{0}'")]
    InvalidLiteral(String),

    /// A call like `defined()` with nothing between the parentheses.
    #[error("can't handle function {0} without argument")]
    MissingArgument(String),

    /// A call whose argument is not a plain variable, e.g. `defined(1)`.
    #[error("{0}() called on something other than a variable")]
    NonVariableArgument(String),

    #[error("unsupported function/macro: {0}")]
    UnsupportedFunction(String),

    /// A bare identifier outside `defined()`, only legal in fuzzy mode.
    #[error("found variable outside of defined() call: {0}")]
    BareVariable(String),

    /// A comparison operator outside fuzzy mode.
    #[error("'{0}' is only supported if fuzzy parsing is enabled")]
    ComparisonWithoutFuzzy(String),

    #[error("can only fuzzy-parse variables compared with integer literals or other variables")]
    UnsupportedComparison,
}

/// Errors that can occur while extracting blocks from a file.
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// Reading the input failed. Never retried, passed through unchanged.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Misused directives: unmatched `#endif`, `#elif`/`#else` without an
    /// open `#if` or after a chain-closing `#else`, or an unterminated
    /// `#if` at end of input. Always fatal for the file.
    #[error("line {line}: {message}")]
    Structural { line: usize, message: String },

    /// An unparseable condition, surfaced only when recovery is disabled.
    #[error("can't parse expression in line {line}: {source}")]
    Expression {
        line: usize,
        #[source]
        source: ExpressionError,
    },
}

impl ExtractorError {
    /// Create a structural error at the given line
    pub fn structural(line: usize, message: impl Into<String>) -> Self {
        Self::Structural {
            line,
            message: message.into(),
        }
    }
}
