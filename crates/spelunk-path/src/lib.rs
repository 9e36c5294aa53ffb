#![doc = include_str!("../README.md")]

pub mod ast;
mod error;
mod lexer;
mod limit;
mod parser;
mod pattern;
mod span;

pub use crate::error::LexError;
pub use crate::error::ParseError;
pub use crate::lexer::Lexer;
pub use crate::lexer::Token;
pub use crate::lexer::TokenKind;
pub use crate::parser::Parser;
pub use crate::pattern::NamePattern;
pub use crate::span::Span;
