use crate::ast::{BlockStatement, Identifier, Statement};
use crate::lexer::TokenKind;
use crate::parser::expressions::{parse_expression, Precedence};
use crate::parser::{ParseError, Parser};

pub fn parse_statement(parser: &mut Parser) -> Result<crate::ast::Statement, ParseError> {
    let statement = match parser.current.kind {
        TokenKind::Let => Statement::Let(parse_let_statement(parser)?),
        TokenKind::Return => Statement::Return(parse_return_statement(parser)?),
        _ => Statement::Expression(parse_expression_statement(parser)?),
    };

    // The terminator is optional, e.g. at the end of input or before a `}`
    if parser.current_is(&TokenKind::SemiColon) {
        parser.advance();
    }
    Ok(statement)
}

/// Parses one statement. On failure the error is recorded on the parser, the
/// cursor is moved past the broken statement and `None` is returned.
pub(crate) fn parse_statement_or_recover(parser: &mut Parser) -> Option<Statement> {
    let consumed_at_start = parser.consumed;
    match parse_statement(parser) {
        Ok(statement) => Some(statement),
        Err(error) => {
            parser.record(error);
            parser.synchronize(consumed_at_start);
            None
        }
    }
}

fn parse_let_statement(parser: &mut Parser) -> Result<crate::ast::LetStatement, ParseError> {
    parser.expect_token(TokenKind::Let)?;
    let name = parser.parse_ident()?;
    parser.expect_token(TokenKind::Assign)?;
    let value = parse_expression(parser, Precedence::Lowest)?;

    Ok(crate::ast::LetStatement {
        identifier: Identifier { name },
        value,
    })
}

fn parse_return_statement(parser: &mut Parser) -> Result<crate::ast::ReturnStatement, ParseError> {
    parser.expect_token(TokenKind::Return)?;
    let value = parse_expression(parser, Precedence::Lowest)?;

    Ok(crate::ast::ReturnStatement { value })
}

fn parse_expression_statement(parser: &mut Parser) -> Result<crate::ast::Expression, ParseError> {
    parse_expression(parser, Precedence::Lowest)
}

/// Parses `{ statement* }`. Broken statements inside the block are recorded
/// and skipped so the rest of the block still parses.
pub fn parse_block_statement(parser: &mut Parser) -> Result<BlockStatement, ParseError> {
    parser.expect_token(TokenKind::LBrace)?;

    let mut statements = Vec::new();
    while !parser.current_is(&TokenKind::RBrace) && !parser.current_is(&TokenKind::Eof) {
        if let Some(statement) = parse_statement_or_recover(parser) {
            statements.push(statement);
        }
    }

    parser.expect_token(TokenKind::RBrace)?;
    Ok(BlockStatement { statements })
}
