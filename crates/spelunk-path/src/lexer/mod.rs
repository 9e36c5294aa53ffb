mod cursor;
mod token;
mod token_kind;

use std::borrow::Cow;

use crate::LexError;
use crate::Span;
use cursor::Cursor;
pub use token::Token;
pub use token_kind::TokenKind;

/// Tokenises a SpelunkPath query.
///
/// The lexer is context aware: it tracks bracket depth so that `and`, `or`
/// and `not` are keywords only inside a predicate, and it fuses identifier
/// characters with `*`/`?` wildcards into single `Pattern` tokens, so
/// `Get*User` arrives at the parser in one piece.
pub struct Lexer<'a> {
    input: &'a str,
    cursor: Cursor<'a>,
    bracket_depth: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            cursor: Cursor::new(input),
            bracket_depth: 0,
        }
    }

    /// Runs the lexer to completion. The stream always ends with an `Eof`
    /// token; the first lexical error fails the whole query.
    pub fn lex(mut self) -> Result<Vec<Token<'a>>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let at_end = token.kind() == TokenKind::Eof;
            tokens.push(token);
            if at_end {
                return Ok(tokens);
            }
        }
    }

    fn next_token(&mut self) -> Result<Token<'a>, LexError> {
        self.cursor.eat_while(char::is_whitespace);
        let start = self.cursor.len_consumed();

        let Some(c) = self.cursor.bump() else {
            return Ok(self.token(TokenKind::Eof, start));
        };

        let kind = match c {
            '/' => self.either('/', TokenKind::DoubleSlash, TokenKind::Slash),
            '.' => self.either('.', TokenKind::DoubleDot, TokenKind::Dot),
            '<' => self.either('=', TokenKind::Le, TokenKind::Lt),
            '>' => self.either('=', TokenKind::Ge, TokenKind::Gt),
            '[' => {
                self.bracket_depth += 1;
                TokenKind::LBracket
            }
            ']' => {
                self.bracket_depth = self.bracket_depth.saturating_sub(1);
                TokenKind::RBracket
            }
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ',' => TokenKind::Comma,
            '@' => TokenKind::At,
            '=' => TokenKind::Eq,
            '-' => TokenKind::Minus,
            ':' => self.pair(':', TokenKind::ColonColon, start, "expected `::`")?,
            '!' => self.pair('=', TokenKind::NotEq, start, "expected `!=`")?,
            '~' => self.pair('=', TokenKind::Contains, start, "expected `~=`")?,
            '\'' | '"' => return self.string(c, start),
            c if c.is_ascii_digit() => {
                self.cursor.eat_while(|c| c.is_ascii_digit());
                TokenKind::Number
            }
            c if is_pattern_start(c) => return Ok(self.pattern(start)),
            c => {
                return Err(LexError::new(
                    format!("unexpected character `{c}`"),
                    Span::new(start, self.cursor.len_consumed()),
                ))
            }
        };
        Ok(self.token(kind, start))
    }

    /// Two-character token when `next` follows, one-character otherwise.
    fn either(&mut self, next: char, double: TokenKind, single: TokenKind) -> TokenKind {
        if self.cursor.first() == next {
            self.cursor.bump();
            double
        } else {
            single
        }
    }

    /// Two-character token whose first character is meaningless alone.
    fn pair(
        &mut self,
        next: char,
        kind: TokenKind,
        start: usize,
        message: &str,
    ) -> Result<TokenKind, LexError> {
        if self.cursor.first() == next {
            self.cursor.bump();
            Ok(kind)
        } else {
            Err(LexError::new(
                message,
                Span::new(start, self.cursor.len_consumed()),
            ))
        }
    }

    fn pattern(&mut self, start: usize) -> Token<'a> {
        loop {
            match self.cursor.first() {
                'A'..='Z' | 'a'..='z' | '0'..='9' | '_' | '*' | '?' => {
                    self.cursor.bump();
                }
                // a hyphen joins names like `if-statement`; a trailing `-`
                // belongs to the next token, as in `last()-1`
                '-' if is_ident_char(self.cursor.second()) => {
                    self.cursor.bump();
                }
                _ => break,
            }
        }
        let end = self.cursor.len_consumed();
        let text = &self.input[start..end];
        let kind = match text {
            "and" if self.bracket_depth > 0 => TokenKind::And,
            "or" if self.bracket_depth > 0 => TokenKind::Or,
            "not" if self.bracket_depth > 0 => TokenKind::Not,
            _ => TokenKind::Pattern,
        };
        Token::new(kind, Cow::Borrowed(text), start, end - start)
    }

    fn string(&mut self, quote: char, start: usize) -> Result<Token<'a>, LexError> {
        let mut value = String::new();
        loop {
            match self.cursor.bump() {
                None => {
                    return Err(LexError::new(
                        "unterminated string",
                        Span::new(start, self.cursor.len_consumed()),
                    ))
                }
                Some('\\') if self.cursor.first() == quote || self.cursor.first() == '\\' => {
                    // the only escapes: the delimiter and the backslash itself
                    if let Some(escaped) = self.cursor.bump() {
                        value.push(escaped);
                    }
                }
                Some(c) if c == quote => break,
                Some(c) => value.push(c),
            }
        }
        let end = self.cursor.len_consumed();
        Ok(Token::new(
            TokenKind::String,
            Cow::Owned(value),
            start,
            end - start,
        ))
    }

    fn token(&self, kind: TokenKind, start: usize) -> Token<'a> {
        let end = self.cursor.len_consumed();
        Token::new(
            kind,
            Cow::Borrowed(&self.input[start..end]),
            start,
            end - start,
        )
    }
}

fn is_pattern_start(c: char) -> bool {
    matches!(c, 'A'..='Z' | 'a'..='z' | '_' | '*' | '?')
}

fn is_ident_char(c: char) -> bool {
    matches!(c, 'A'..='Z' | 'a'..='z' | '0'..='9' | '_')
}
