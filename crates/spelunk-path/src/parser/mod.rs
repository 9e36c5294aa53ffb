pub(crate) mod grammar;

use crate::ast::PathExpr;
use crate::lexer::Lexer;
use crate::lexer::Token;
use crate::lexer::TokenKind;
use crate::limit::LimitTracker;
use crate::ParseError;

/// Deep enough for any real query, shallow enough to fail long before the
/// stack does.
const DEFAULT_RECURSION_LIMIT: usize = 128;

/// Parses a SpelunkPath query into a [`PathExpr`].
///
/// ```rust
/// use spelunk_path::Parser;
///
/// let path = Parser::new("//class[B]/method[F]").parse().unwrap();
/// assert_eq!(path.steps.len(), 2);
/// ```
pub struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Token<'a>>,
    index: usize,
    recursion: LimitTracker,
}

impl<'a> Parser<'a> {
    /// Create a new instance of a parser given a query string.
    pub fn new(input: &'a str) -> Self {
        Parser {
            input,
            tokens: Vec::new(),
            index: 0,
            recursion: LimitTracker::new(DEFAULT_RECURSION_LIMIT),
        }
    }

    /// Configure the recursion limit to use while parsing.
    pub fn recursion_limit(mut self, limit: usize) -> Self {
        self.recursion = LimitTracker::new(limit);
        self
    }

    /// Runs the lexer and the parser. Either fails the whole query.
    pub fn parse(mut self) -> Result<PathExpr, ParseError> {
        self.tokens = Lexer::new(self.input).lex()?;
        let path = grammar::path(&mut self)?;
        match self.peek() {
            TokenKind::Eof => Ok(path),
            _ => Err(self.unexpected("end of query")),
        }
    }

    pub(crate) fn current(&self) -> &Token<'a> {
        &self.tokens[self.index]
    }

    pub(crate) fn peek(&self) -> TokenKind {
        self.current().kind()
    }

    pub(crate) fn peek_ahead(&self, n: usize) -> TokenKind {
        self.tokens
            .get(self.index + n)
            .map(Token::kind)
            .unwrap_or(TokenKind::Eof)
    }

    /// Advances past the current token and returns it. Never moves past the
    /// trailing `Eof`.
    pub(crate) fn bump(&mut self) -> Token<'a> {
        let token = self.tokens[self.index].clone();
        if self.index < self.tokens.len() - 1 {
            self.index += 1;
        }
        token
    }

    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.peek() == kind
    }

    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(
        &mut self,
        kind: TokenKind,
        expected: &str,
    ) -> Result<Token<'a>, ParseError> {
        if self.at(kind) {
            Ok(self.bump())
        } else {
            Err(self.unexpected(expected))
        }
    }

    pub(crate) fn unexpected(&self, expected: &str) -> ParseError {
        let token = self.current();
        ParseError::syntax(
            format!("expected {expected}, found {}", token.describe()),
            token.span(),
        )
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn rewind(&mut self, index: usize) {
        self.index = index;
    }

    pub(crate) fn enter_recursion(&mut self) -> Result<(), ParseError> {
        self.recursion.consume();
        if self.recursion.limited() {
            Err(ParseError::syntax(
                "query nesting exceeds the recursion limit",
                self.current().span(),
            ))
        } else {
            Ok(())
        }
    }

    pub(crate) fn exit_recursion(&mut self) {
        self.recursion.release();
    }
}
