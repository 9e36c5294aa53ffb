use std::borrow::Cow;
use std::fmt;

use crate::lexer::TokenKind;
use crate::Span;

/// A single token. Most tokens borrow their text from the query string;
/// string literals own their unquoted value when unescaping changed it.
#[derive(Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub(crate) kind: TokenKind,
    pub(crate) data: Cow<'a, str>,
    pub(crate) index: usize,
    pub(crate) len: usize,
}

impl<'a> Token<'a> {
    pub(crate) fn new(kind: TokenKind, data: Cow<'a, str>, index: usize, len: usize) -> Self {
        Token {
            kind,
            data,
            index,
            len,
        }
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// The token text. For `String` tokens this is the unquoted value, for
    /// everything else the raw lexeme.
    pub fn data(&self) -> &str {
        &self.data
    }

    /// Byte offset of the start of the lexeme in the query.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Byte range of the lexeme in the query.
    pub fn span(&self) -> Span {
        Span::new(self.index, self.index + self.len)
    }

    /// How the token reads in an error message.
    pub(crate) fn describe(&self) -> String {
        match self.kind {
            TokenKind::Eof => "end of query".to_string(),
            TokenKind::String => format!("string '{}'", self.data),
            _ => format!("`{}`", self.data),
        }
    }
}

impl fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Span { start, end } = self.span();
        write!(f, "{:?}@{}:{} {:?}", self.kind, start, end, self.data)
    }
}
