use std::rc::Rc;

use super::error::ParseError;
use super::statements::parse_block_statement;
use crate::ast::{Expression, Identifier, InfixOperationKind, PrefixOperationKind};
use crate::lexer::{Token, TokenKind};
use crate::parser::Parser;

#[derive(PartialOrd, PartialEq, Debug, Clone, Copy)]
pub enum Precedence {
    Lowest = 0,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
}

pub fn precedence_of(token: &TokenKind) -> Precedence {
    match token {
        TokenKind::Equal => Precedence::Equals,
        TokenKind::NotEqual => Precedence::Equals,
        TokenKind::LessThan => Precedence::LessGreater,
        TokenKind::GreaterThan => Precedence::LessGreater,
        TokenKind::Plus => Precedence::Sum,
        TokenKind::Minus => Precedence::Sum,
        TokenKind::Asterisk => Precedence::Product,
        TokenKind::Slash => Precedence::Product,
        TokenKind::LParen => Precedence::Call,
        _ => Precedence::Lowest,
    }
}

/// Rule for a token that starts an expression. Receives the already
/// consumed token.
type PrefixFunction = fn(Token, &mut Parser) -> Result<Expression, ParseError>;

/// Rule for a token that follows a complete expression. Receives the
/// consumed operator token and the left operand.
type InfixFunction = fn(Token, Expression, &mut Parser) -> Result<Expression, ParseError>;

/// Parses an expression, folding in infix operators for as long as they bind
/// tighter than `precedence`.
pub fn parse_expression(
    parser: &mut Parser,
    precedence: Precedence,
) -> Result<Expression, ParseError> {
    let Some(prefix_parse_function) = prefix_parsing_function(&parser.current_token().kind)
    else {
        return Err(ParseError::NoPrefixFunction(parser.current_token().clone()));
    };
    let token = parser.advance();
    let mut left_expression = prefix_parse_function(token, parser)?;

    loop {
        let next_kind = &parser.current_token().kind;
        if precedence >= precedence_of(next_kind) {
            break;
        }
        let Some(infix_parse_function) = infix_parsing_function(next_kind) else {
            break;
        };

        let operator = parser.advance();
        left_expression = infix_parse_function(operator, left_expression, parser)?;
    }

    Ok(left_expression)
}

fn parse_identifier(token: Token, _parser: &mut Parser) -> Result<Expression, ParseError> {
    match token.kind {
        TokenKind::Ident(name) => Ok(Expression::Identifier(Identifier { name })),
        _ => Err(ParseError::ExpectedIdentifier { got: token }),
    }
}

fn parse_integer_literal(token: Token, _parser: &mut Parser) -> Result<Expression, ParseError> {
    match &token.kind {
        TokenKind::Int(literal) => literal
            .parse()
            .map(Expression::IntegerLiteral)
            .map_err(|source| ParseError::InvalidInteger {
                literal: literal.clone(),
                source,
            }),
        _ => Err(ParseError::NoPrefixFunction(token)),
    }
}

fn parse_string_literal(token: Token, _parser: &mut Parser) -> Result<Expression, ParseError> {
    match token.kind {
        TokenKind::String(value) => Ok(Expression::StringLiteral(value.to_string())),
        _ => Err(ParseError::NoPrefixFunction(token)),
    }
}

fn parse_boolean_literal(token: Token, _parser: &mut Parser) -> Result<Expression, ParseError> {
    Ok(Expression::BooleanLiteral(token.kind == TokenKind::True))
}

fn parse_prefix_operation(token: Token, parser: &mut Parser) -> Result<Expression, ParseError> {
    let kind = match token.kind {
        TokenKind::Bang => PrefixOperationKind::Bang,
        TokenKind::Minus => PrefixOperationKind::Minus,
        _ => return Err(ParseError::NoPrefixFunction(token)),
    };

    Ok(Expression::PrefixOperation(
        kind,
        Box::new(parse_expression(parser, Precedence::Prefix)?),
    ))
}

fn parse_grouped_expression(_token: Token, parser: &mut Parser) -> Result<Expression, ParseError> {
    let expression = parse_expression(parser, Precedence::Lowest)?;
    parser.expect_token(TokenKind::RParen)?;

    Ok(expression)
}

/// Parses `element (separator element)* separator? terminator`, consuming the
/// terminator. An immediate terminator gives an empty list.
fn parse_sequence<'a, T>(
    parser: &mut Parser<'a>,
    parse_element: impl Fn(&mut Parser<'a>) -> Result<T, ParseError>,
    separator: TokenKind,
    terminator: TokenKind,
) -> Result<Vec<T>, ParseError> {
    let mut elements = Vec::new();

    loop {
        if parser.current_is(&terminator) {
            parser.advance();
            return Ok(elements);
        }

        elements.push(parse_element(parser)?);

        if parser.current_is(&separator) {
            parser.advance();
        } else {
            parser.expect_token(terminator)?;
            return Ok(elements);
        }
    }
}

fn parse_if_expression(_token: Token, parser: &mut Parser) -> Result<Expression, ParseError> {
    let condition = Box::new(parse_expression(parser, Precedence::Lowest)?);

    let consequence = parse_block_statement(parser)?;

    let alternative = if parser.current_is(&TokenKind::Else) {
        parser.advance();
        Some(parse_block_statement(parser)?)
    } else {
        None
    };

    Ok(Expression::IfExpression {
        condition,
        consequence,
        alternative,
    })
}

fn parse_function_literal(_token: Token, parser: &mut Parser) -> Result<Expression, ParseError> {
    parser.expect_token(TokenKind::LParen)?;
    let parameters = parse_parameters(parser)?;

    let body = Rc::new(parse_block_statement(parser)?);

    Ok(Expression::FunctionLiteral { parameters, body })
}

fn parse_parameters(parser: &mut Parser) -> Result<Vec<Identifier>, ParseError> {
    parse_sequence(
        parser,
        |parser| parser.parse_ident().map(|name| Identifier { name }),
        TokenKind::Comma,
        TokenKind::RParen,
    )
}

fn prefix_parsing_function(token: &TokenKind) -> Option<PrefixFunction> {
    match token {
        TokenKind::Ident(_) => Some(parse_identifier),
        TokenKind::Int(_) => Some(parse_integer_literal),
        TokenKind::String(_) => Some(parse_string_literal),
        TokenKind::True | TokenKind::False => Some(parse_boolean_literal),
        TokenKind::Bang | TokenKind::Minus => Some(parse_prefix_operation),
        TokenKind::LParen => Some(parse_grouped_expression),
        TokenKind::If => Some(parse_if_expression),
        TokenKind::Function => Some(parse_function_literal),
        _ => None,
    }
}

fn parse_infix_operation(
    token: Token,
    left: Expression,
    parser: &mut Parser,
) -> Result<Expression, ParseError> {
    let kind = match token.kind {
        TokenKind::Plus => InfixOperationKind::Plus,
        TokenKind::Minus => InfixOperationKind::Minus,
        TokenKind::LessThan => InfixOperationKind::LessThan,
        TokenKind::GreaterThan => InfixOperationKind::GreaterThan,
        TokenKind::Equal => InfixOperationKind::Equal,
        TokenKind::NotEqual => InfixOperationKind::NotEqual,
        TokenKind::Asterisk => InfixOperationKind::Multiply,
        TokenKind::Slash => InfixOperationKind::Divide,
        _ => return Err(ParseError::NoPrefixFunction(token)),
    };
    // Parsing the right side at the operator's own precedence makes equal
    // precedence operators group to the left.
    let right = parse_expression(parser, precedence_of(&token.kind))?;

    Ok(Expression::InfixOperation(
        kind,
        Box::new(left),
        Box::new(right),
    ))
}

fn parse_call_expression(
    _token: Token,
    left: Expression,
    parser: &mut Parser,
) -> Result<Expression, ParseError> {
    let arguments = parse_sequence(
        parser,
        |parser| parse_expression(parser, Precedence::Lowest),
        TokenKind::Comma,
        TokenKind::RParen,
    )?;

    Ok(Expression::CallExpression {
        function: Box::new(left),
        arguments,
    })
}

fn infix_parsing_function(token: &TokenKind) -> Option<InfixFunction> {
    match token {
        TokenKind::Plus
        | TokenKind::Minus
        | TokenKind::LessThan
        | TokenKind::GreaterThan
        | TokenKind::Equal
        | TokenKind::NotEqual
        | TokenKind::Asterisk
        | TokenKind::Slash => Some(parse_infix_operation),
        TokenKind::LParen => Some(parse_call_expression),
        _ => None,
    }
}
