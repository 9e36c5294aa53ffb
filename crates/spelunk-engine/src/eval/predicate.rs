//! Per-node predicate evaluation.
//!
//! Nothing here aborts on a predicate that cannot be computed: a missing
//! attribute, a malformed number or a rejected regex all evaluate to false
//! and the walk continues.

use std::borrow::Cow;

use spelunk_path::ast::AttrLiteral;
use spelunk_path::ast::CmpOp;
use spelunk_path::ast::NodeTest;
use spelunk_path::ast::PositionTest;
use spelunk_path::ast::PredExpr;
use spelunk_path::NamePattern;

use crate::error::EvalError;
use crate::eval::host_error;
use crate::eval::Run;
use crate::host::is_expression_type;
use crate::host::is_statement_type;
use crate::host::AttrValue;
use crate::host::SyntaxHost;

/// Position of a node within the candidate collection a predicate is
/// filtering, 1-based in the query surface.
#[derive(Debug, Clone, Copy)]
pub(super) struct PredContext {
    pub(super) index: usize,
    pub(super) len: usize,
}

pub(super) fn node_test_matches<H: SyntaxHost>(
    host: &H,
    test: &NodeTest,
    step: usize,
    node: &H::Node,
) -> Result<bool, EvalError<H::Node>> {
    match test {
        NodeTest::Any => Ok(true),
        NodeTest::TypeName(name) => {
            let ty = host.node_type(node).map_err(|e| host_error(step, e))?;
            Ok(match name.as_str() {
                // the generic tests match whole categories; `statement`
                // deliberately excludes raw blocks
                "statement" => is_statement_type(&ty),
                "expression" => is_expression_type(&ty),
                _ => ty == *name,
            })
        }
        NodeTest::Name(pattern) => {
            let name = host.node_name(node).map_err(|e| host_error(step, e))?;
            Ok(name.is_some_and(|name| pattern.matches(&name)))
        }
    }
}

pub(super) fn eval<H: SyntaxHost>(
    run: &mut Run<'_, H>,
    predicate: &PredExpr,
    step: usize,
    node: &H::Node,
    ctx: PredContext,
) -> Result<bool, EvalError<H::Node>> {
    match predicate {
        PredExpr::Or(lhs, rhs) => {
            Ok(eval(run, lhs, step, node, ctx)? || eval(run, rhs, step, node, ctx)?)
        }
        PredExpr::And(lhs, rhs) => {
            Ok(eval(run, lhs, step, node, ctx)? && eval(run, rhs, step, node, ctx)?)
        }
        PredExpr::Not(inner) => Ok(!eval(run, inner, step, node, ctx)?),
        PredExpr::Position(test) => Ok(position_holds(*test, ctx)),
        PredExpr::Name(pattern) => {
            let name = run.host.node_name(node).map_err(|e| host_error(step, e))?;
            Ok(name.is_some_and(|name| pattern.matches(&name)))
        }
        PredExpr::Path(sub) => {
            let result = run.eval_path(sub, vec![node.clone()])?;
            Ok(!result.is_empty())
        }
        PredExpr::Attribute { name, cmp } => attribute(run, step, node, name, cmp.as_ref()),
    }
}

/// Selects within a candidate collection for a predicate that is purely
/// positional. Out-of-range positions select nothing.
pub(super) fn select_position<N>(test: PositionTest, candidates: Vec<N>) -> Vec<N> {
    let len = candidates.len() as i64;
    let position = match test {
        PositionTest::At(k) => k,
        PositionTest::First => 1,
        PositionTest::Last { offset } => len - offset,
        PositionTest::Cmp { op, value } => {
            return candidates
                .into_iter()
                .enumerate()
                .filter(|(index, _)| compare(op, *index as i64 + 1, value))
                .map(|(_, node)| node)
                .collect();
        }
    };
    if position < 1 {
        return Vec::new();
    }
    match candidates.into_iter().nth(position as usize - 1) {
        Some(node) => vec![node],
        None => Vec::new(),
    }
}

/// A positional test nested inside a boolean expression becomes a per-node
/// test against the same collection.
fn position_holds(test: PositionTest, ctx: PredContext) -> bool {
    let position = ctx.index as i64 + 1;
    match test {
        PositionTest::At(k) => position == k,
        PositionTest::First => position == 1,
        PositionTest::Last { offset } => position == ctx.len as i64 - offset,
        PositionTest::Cmp { op, value } => compare(op, position, value),
    }
}

fn attribute<H: SyntaxHost>(
    run: &mut Run<'_, H>,
    step: usize,
    node: &H::Node,
    name: &str,
    cmp: Option<&(CmpOp, AttrLiteral)>,
) -> Result<bool, EvalError<H::Node>> {
    // `@contains` and `@matches` test the node text, not a host attribute
    match name {
        "contains" => return contains_text(run, step, node, cmp),
        "matches" => return matches_regex(run, step, node, cmp),
        _ => {}
    }

    let value = run
        .host
        .attribute(node, name)
        .map_err(|e| host_error(step, e))?;
    let Some((op, literal)) = cmp else {
        return Ok(value.as_ref().is_some_and(AttrValue::is_truthy));
    };
    let Some(value) = value else {
        return Ok(false);
    };
    let actual = value.as_text();
    Ok(match (op, literal) {
        // `@modifiers ~= 'async'`: membership in the modifier set
        (CmpOp::Contains, AttrLiteral::Str(needle)) if name == "modifiers" => {
            actual.split_whitespace().any(|modifier| modifier == needle)
        }
        (CmpOp::Contains, literal) => actual.contains(literal_text(literal).as_ref()),
        (CmpOp::Eq, AttrLiteral::Str(expected)) => string_eq(actual, expected),
        (CmpOp::Ne, AttrLiteral::Str(expected)) => !string_eq(actual, expected),
        (CmpOp::Eq, AttrLiteral::Number(expected)) => {
            actual.trim().parse::<i64>().is_ok_and(|lhs| lhs == *expected)
        }
        (CmpOp::Ne, AttrLiteral::Number(expected)) => {
            actual.trim().parse::<i64>().is_ok_and(|lhs| lhs != *expected)
        }
        (op, literal) => numeric_compare(*op, actual, literal),
    })
}

/// `=` is a glob match when the pattern carries wildcards, exact equality
/// otherwise; `!=` stays its exact negation.
fn string_eq(actual: &str, expected: &str) -> bool {
    if expected.contains(['*', '?']) {
        NamePattern::new(expected).matches(actual)
    } else {
        actual == expected
    }
}

/// `@contains` substring-tests the normalised node text whatever operator
/// was written. Both sides are compared with all whitespace stripped, so
/// `x==null` and `x == null` match the same needle.
fn contains_text<H: SyntaxHost>(
    run: &mut Run<'_, H>,
    step: usize,
    node: &H::Node,
    cmp: Option<&(CmpOp, AttrLiteral)>,
) -> Result<bool, EvalError<H::Node>> {
    let Some((_, literal)) = cmp else {
        return Ok(false);
    };
    let needle = strip_whitespace(&literal_text(literal));
    let text = run
        .host
        .normalized_text(node)
        .map_err(|e| host_error(step, e))?;
    Ok(strip_whitespace(&text).contains(&needle))
}

fn matches_regex<H: SyntaxHost>(
    run: &mut Run<'_, H>,
    step: usize,
    node: &H::Node,
    cmp: Option<&(CmpOp, AttrLiteral)>,
) -> Result<bool, EvalError<H::Node>> {
    let Some((_, literal)) = cmp else {
        return Ok(false);
    };
    let Some(regex) = run.regex(step, &literal_text(literal)) else {
        return Ok(false);
    };
    let text = run
        .host
        .normalized_text(node)
        .map_err(|e| host_error(step, e))?;
    Ok(regex.is_match(&text))
}

fn literal_text(literal: &AttrLiteral) -> Cow<'_, str> {
    match literal {
        AttrLiteral::Str(value) => Cow::Borrowed(value.as_str()),
        AttrLiteral::Number(value) => Cow::Owned(value.to_string()),
    }
}

fn numeric_compare(op: CmpOp, actual: &str, literal: &AttrLiteral) -> bool {
    let rhs = match literal {
        AttrLiteral::Number(value) => *value,
        AttrLiteral::Str(value) => match value.trim().parse() {
            Ok(value) => value,
            Err(_) => return false,
        },
    };
    match actual.trim().parse::<i64>() {
        Ok(lhs) => compare(op, lhs, rhs),
        Err(_) => false,
    }
}

fn compare(op: CmpOp, lhs: i64, rhs: i64) -> bool {
    match op {
        CmpOp::Eq => lhs == rhs,
        CmpOp::Ne => lhs != rhs,
        CmpOp::Lt => lhs < rhs,
        CmpOp::Le => lhs <= rhs,
        CmpOp::Gt => lhs > rhs,
        CmpOp::Ge => lhs >= rhs,
        // the parser never pairs `~=` with a position
        CmpOp::Contains => false,
    }
}

fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}
