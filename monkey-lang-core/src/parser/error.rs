use std::rc::Rc;

use thiserror::Error;

use crate::lexer::{Token, TokenKind};

/// A recoverable syntax problem. The `Display` output is the message shown to users.
#[derive(Debug, PartialEq, Error)]
pub enum ParseError {
    #[error("expected next token to be {expected}, got {} instead", .got.kind)]
    UnexpectedToken { expected: TokenKind, got: Token },
    #[error("expected identifier, got {} instead", .got.kind)]
    ExpectedIdentifier { got: Token },
    #[error("no prefix parse function for {} found", .0.kind)]
    NoPrefixFunction(Token),
    #[error("could not parse \"{literal}\" as integer")]
    InvalidInteger {
        literal: Rc<str>,
        #[source]
        source: std::num::ParseIntError,
    },
}

impl ParseError {
    pub fn unexpected_token(expected: TokenKind, got: &Token) -> Self {
        ParseError::UnexpectedToken {
            expected,
            got: got.clone(),
        }
    }
}
