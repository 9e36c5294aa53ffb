use crate::Span;

/// A lexical failure: an unterminated string, or a character the query
/// language has no use for.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct LexError {
    pub message: String,
    pub span: Span,
}

impl LexError {
    pub(crate) fn new(message: impl Into<String>, span: Span) -> Self {
        LexError {
            message: message.into(),
            span,
        }
    }
}

/// A failed parse. Lexical errors abort the parse and surface here
/// unchanged; either way the whole query is rejected, there is no recovery.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error("{message}")]
    Syntax { message: String, span: Span },
}

impl ParseError {
    pub(crate) fn syntax(message: impl Into<String>, span: Span) -> Self {
        ParseError::Syntax {
            message: message.into(),
            span,
        }
    }

    /// Human-readable reason for the failure.
    pub fn message(&self) -> &str {
        match self {
            ParseError::Lex(error) => &error.message,
            ParseError::Syntax { message, .. } => message,
        }
    }

    /// Where in the query the failure was detected.
    pub fn span(&self) -> Span {
        match self {
            ParseError::Lex(error) => error.span,
            ParseError::Syntax { span, .. } => *span,
        }
    }
}
