pub mod error;
pub mod expressions;
pub mod statements;

use std::rc::Rc;

use crate::ast::Program;
use crate::lexer::{Token, TokenKind, Tokenizer};
pub use error::ParseError;
use statements::parse_statement_or_recover;

/// Pratt parser over a token stream with a two token window.
///
/// `current` is the next token to be consumed and `peek` the one after it.
/// Once the stream runs out both are `Eof` tokens, and advancing past the end
/// keeps producing `Eof`.
pub struct Parser<'a> {
    tokens: Box<dyn Iterator<Item = Token> + 'a>,
    current: Token,
    peek: Token,
    errors: Vec<ParseError>,
    consumed: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: impl Iterator<Item = Token> + 'a) -> Self {
        let mut tokens: Box<dyn Iterator<Item = Token> + 'a> = Box::new(tokens);
        let current = tokens.next().unwrap_or_else(|| Token::eof(0));
        let peek = tokens.next().unwrap_or_else(|| Token::eof(current.end));
        Self {
            tokens,
            current,
            peek,
            errors: Vec::new(),
            consumed: 0,
        }
    }

    pub fn from_source(input: &'a str) -> Self {
        Self::new(Tokenizer::new(input))
    }

    pub fn current_token(&self) -> &Token {
        &self.current
    }

    pub fn peek_token(&self) -> &Token {
        &self.peek
    }

    /// Moves the window one token forward and returns the token that was current.
    pub fn advance(&mut self) -> Token {
        let next = self
            .tokens
            .next()
            .unwrap_or_else(|| Token::eof(self.peek.end));
        let peek = std::mem::replace(&mut self.peek, next);
        self.consumed += 1;
        std::mem::replace(&mut self.current, peek)
    }

    pub(crate) fn current_is(&self, kind: &TokenKind) -> bool {
        &self.current.kind == kind
    }

    pub(crate) fn parse_ident(&mut self) -> Result<Rc<str>, ParseError> {
        match &self.current.kind {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(ParseError::ExpectedIdentifier {
                got: self.current.clone(),
            }),
        }
    }

    /// Consumes the current token if it has the given kind. On mismatch
    /// nothing is consumed.
    pub(crate) fn expect_token(&mut self, token_kind: TokenKind) -> Result<(), ParseError> {
        if self.current.kind == token_kind {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::unexpected_token(token_kind, &self.current))
        }
    }

    fn record(&mut self, error: ParseError) {
        tracing::debug!(%error, offset = self.current.start, "parse error");
        self.errors.push(error);
    }

    /// Skips to just past the next `;`, or up to a closing `}` or the end of
    /// input. Always makes progress if the failed statement consumed nothing.
    fn synchronize(&mut self, consumed_at_start: usize) {
        loop {
            match self.current.kind {
                TokenKind::SemiColon => {
                    self.advance();
                    break;
                }
                TokenKind::RBrace | TokenKind::Eof => break,
                _ => {
                    self.advance();
                }
            }
        }
        if self.consumed == consumed_at_start && !self.current_is(&TokenKind::Eof) {
            self.advance();
        }
    }

    /// Parses the whole stream. Never fails: statements that could not be
    /// parsed are left out of the program and reported in the error list.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn parse_program(&mut self) -> (Program, Vec<ParseError>) {
        let mut statements = Vec::new();

        while !self.current_is(&TokenKind::Eof) {
            if let Some(statement) = parse_statement_or_recover(self) {
                statements.push(statement);
            }
        }

        let errors = std::mem::take(&mut self.errors);
        tracing::debug!(
            statements = statements.len(),
            errors = errors.len(),
            "parsed program"
        );
        (Program { statements }, errors)
    }
}

/// Parses `input`, rejecting the program if any parse error was found.
pub fn parse(input: &str) -> Result<Program, Vec<ParseError>> {
    let (program, errors) = Parser::from_source(input).parse_program();
    if errors.is_empty() {
        Ok(program)
    } else {
        Err(errors)
    }
}
