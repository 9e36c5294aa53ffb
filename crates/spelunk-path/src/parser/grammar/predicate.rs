use crate::ast::AttrLiteral;
use crate::ast::CmpOp;
use crate::ast::PositionTest;
use crate::ast::PredExpr;
use crate::lexer::TokenKind;
use crate::parser::grammar::path;
use crate::NamePattern;
use crate::ParseError;
use crate::Parser;
use crate::Span;

/// ```txt
/// orExpr ::= andExpr ('or' andExpr)*
/// ```
pub(crate) fn or_expr(p: &mut Parser) -> Result<PredExpr, ParseError> {
    p.enter_recursion()?;
    let result = or_expr_inner(p);
    p.exit_recursion();
    result
}

fn or_expr_inner(p: &mut Parser) -> Result<PredExpr, ParseError> {
    let mut lhs = and_expr(p)?;
    while p.eat(TokenKind::Or) {
        let rhs = and_expr(p)?;
        lhs = PredExpr::Or(Box::new(lhs), Box::new(rhs));
    }
    Ok(lhs)
}

/// ```txt
/// andExpr ::= notExpr ('and' notExpr)*
/// ```
fn and_expr(p: &mut Parser) -> Result<PredExpr, ParseError> {
    let mut lhs = not_expr(p)?;
    while p.eat(TokenKind::And) {
        let rhs = not_expr(p)?;
        lhs = PredExpr::And(Box::new(lhs), Box::new(rhs));
    }
    Ok(lhs)
}

/// ```txt
/// notExpr ::= 'not' '(' orExpr ')' | primary
/// ```
fn not_expr(p: &mut Parser) -> Result<PredExpr, ParseError> {
    if p.eat(TokenKind::Not) {
        p.expect(TokenKind::LParen, "`(` after `not`")?;
        let inner = or_expr(p)?;
        p.expect(TokenKind::RParen, "`)`")?;
        Ok(PredExpr::Not(Box::new(inner)))
    } else {
        primary(p)
    }
}

/// ```txt
/// primary ::= '(' orExpr ')'
///           | attrPred | positionPred | funcCall
///           | pathPred | nameGlob
/// ```
fn primary(p: &mut Parser) -> Result<PredExpr, ParseError> {
    match p.peek() {
        TokenKind::LParen => {
            p.bump();
            let inner = or_expr(p)?;
            p.expect(TokenKind::RParen, "`)`")?;
            Ok(inner)
        }
        TokenKind::At => attr_pred(p),
        TokenKind::Number => {
            let value = number(p)?;
            Ok(PredExpr::Position(PositionTest::At(value)))
        }
        TokenKind::Dot | TokenKind::DoubleDot | TokenKind::Slash | TokenKind::DoubleSlash => {
            Ok(PredExpr::Path(path::path(p)?))
        }
        TokenKind::Pattern => pattern_primary(p),
        _ => Err(p.unexpected("a predicate")),
    }
}

/// A primary that opens with a pattern: a positional function call, a bare
/// name test (possibly dotted, like `namespace[A.B.C]`), or the first step
/// of a nested relative path.
fn pattern_primary(p: &mut Parser) -> Result<PredExpr, ParseError> {
    let start = p.index();
    let token = p.bump();

    if p.at(TokenKind::LParen) {
        return func_call(p, token.data(), token.span());
    }

    let mut name = token.data().to_string();
    while p.at(TokenKind::Dot) && p.peek_ahead(1) == TokenKind::Pattern {
        p.bump();
        name.push('.');
        name.push_str(p.bump().data());
    }
    match p.peek() {
        // `[foo/bar]`, `[foo[1]]`: a nested path after all
        TokenKind::Slash | TokenKind::DoubleSlash | TokenKind::LBracket => {
            p.rewind(start);
            Ok(PredExpr::Path(path::path(p)?))
        }
        _ => Ok(PredExpr::Name(NamePattern::new(name))),
    }
}

/// ```txt
/// funcCall ::= name '(' ')' ('-' number | cmpOp number)?
/// ```
///
/// Only the positional functions exist: `first()`, `last()` (optionally
/// `last()-k`) and `position()` with a required comparison.
fn func_call(p: &mut Parser, name: &str, span: Span) -> Result<PredExpr, ParseError> {
    p.expect(TokenKind::LParen, "`(`")?;
    p.expect(TokenKind::RParen, "`)`")?;
    match name {
        "first" => Ok(PredExpr::Position(PositionTest::First)),
        "last" => {
            let offset = if p.eat(TokenKind::Minus) { number(p)? } else { 0 };
            Ok(PredExpr::Position(PositionTest::Last { offset }))
        }
        "position" => {
            let Some(op) = cmp_op(p.peek()) else {
                return Err(ParseError::syntax(
                    "expected a comparison after `position()`",
                    span,
                ));
            };
            if op == CmpOp::Contains {
                return Err(ParseError::syntax("`~=` cannot apply to `position()`", span));
            }
            p.bump();
            let value = number(p)?;
            Ok(PredExpr::Position(match op {
                CmpOp::Eq => PositionTest::At(value),
                op => PositionTest::Cmp { op, value },
            }))
        }
        _ => Err(ParseError::syntax(
            format!("unknown function `{name}()`"),
            span,
        )),
    }
}

/// ```txt
/// attrPred ::= '@' name (cmpOp literal)?
/// ```
fn attr_pred(p: &mut Parser) -> Result<PredExpr, ParseError> {
    p.bump();
    let name = p
        .expect(TokenKind::Pattern, "an attribute name")?
        .data()
        .to_string();
    let Some(op) = cmp_op(p.peek()) else {
        return Ok(PredExpr::Attribute { name, cmp: None });
    };
    p.bump();
    let literal = match p.peek() {
        TokenKind::String | TokenKind::Pattern => AttrLiteral::Str(p.bump().data().to_string()),
        TokenKind::Number => AttrLiteral::Number(number(p)?),
        _ => return Err(p.unexpected("a string or number literal")),
    };
    Ok(PredExpr::Attribute {
        name,
        cmp: Some((op, literal)),
    })
}

fn number(p: &mut Parser) -> Result<i64, ParseError> {
    let token = p.expect(TokenKind::Number, "a number")?;
    token
        .data()
        .parse()
        .map_err(|_| ParseError::syntax("number out of range", token.span()))
}

fn cmp_op(kind: TokenKind) -> Option<CmpOp> {
    Some(match kind {
        TokenKind::Eq => CmpOp::Eq,
        TokenKind::NotEq => CmpOp::Ne,
        TokenKind::Contains => CmpOp::Contains,
        TokenKind::Lt => CmpOp::Lt,
        TokenKind::Le => CmpOp::Le,
        TokenKind::Gt => CmpOp::Gt,
        TokenKind::Ge => CmpOp::Ge,
        _ => return None,
    })
}
