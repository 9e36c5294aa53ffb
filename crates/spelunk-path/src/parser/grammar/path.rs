use crate::ast::Anchor;
use crate::ast::Axis;
use crate::ast::NodeTest;
use crate::ast::PathExpr;
use crate::ast::PredExpr;
use crate::ast::Step;
use crate::lexer::TokenKind;
use crate::parser::grammar::predicate;
use crate::NamePattern;
use crate::ParseError;
use crate::Parser;

/// ```txt
/// path ::= ('/' | '//' | )? step (('/' | '//') step)*
/// ```
pub(crate) fn path(p: &mut Parser) -> Result<PathExpr, ParseError> {
    // nested path predicates recurse back into here
    p.enter_recursion()?;
    let result = path_inner(p);
    p.exit_recursion();
    result
}

fn path_inner(p: &mut Parser) -> Result<PathExpr, ParseError> {
    let anchor;
    // the axis the most recent separator implies for the next step
    let mut axis;
    match p.peek() {
        TokenKind::Slash => {
            p.bump();
            anchor = Anchor::Absolute;
            axis = Axis::Child;
        }
        TokenKind::DoubleSlash => {
            p.bump();
            anchor = Anchor::Absolute;
            axis = Axis::DescendantOrSelf;
        }
        _ => {
            anchor = Anchor::Relative;
            axis = Axis::Child;
        }
    }

    let mut steps = Vec::new();
    loop {
        let before = p.index();
        let Some(step) = step(p, axis)? else {
            if steps.is_empty() && anchor == Anchor::Absolute && axis == Axis::Child {
                // a bare `/` selects the root
                break;
            }
            return Err(p.unexpected("a step"));
        };
        // a step that consumed nothing would loop forever
        if p.index() == before {
            return Err(p.unexpected("a step"));
        }
        steps.push(step);
        match p.peek() {
            TokenKind::Slash => {
                p.bump();
                axis = Axis::Child;
            }
            TokenKind::DoubleSlash => {
                p.bump();
                axis = Axis::DescendantOrSelf;
            }
            _ => break,
        }
    }
    Ok(PathExpr { anchor, steps })
}

/// ```txt
/// step     ::= (axis '::')? nodeTest predicate*
/// nodeTest ::= '*' | typeName | pattern | '.' | '..'
/// ```
///
/// Returns `None` without consuming anything when no step can start here
/// (end of query, or the `]` closing a nested path).
fn step(p: &mut Parser, separator_axis: Axis) -> Result<Option<Step>, ParseError> {
    match p.peek() {
        TokenKind::Dot => {
            p.bump();
            return Ok(Some(Step {
                axis: Axis::SelfNode,
                node_test: NodeTest::Any,
                predicates: predicates(p)?,
            }));
        }
        TokenKind::DoubleDot => {
            p.bump();
            return Ok(Some(Step {
                axis: Axis::Parent,
                node_test: NodeTest::Any,
                predicates: predicates(p)?,
            }));
        }
        TokenKind::Pattern => {}
        _ => return Ok(None),
    }

    let mut axis = separator_axis;
    if p.peek_ahead(1) == TokenKind::ColonColon {
        let token = p.bump();
        let Some(explicit) = Axis::from_name(token.data()) else {
            return Err(ParseError::syntax(
                format!("unknown axis `{}`", token.data()),
                token.span(),
            ));
        };
        axis = explicit;
        p.bump();
        if !p.at(TokenKind::Pattern) {
            return Err(p.unexpected("a node test"));
        }
    }

    let name = p.bump();
    let node_test = node_test(name.data());
    Ok(Some(Step {
        axis,
        node_test,
        predicates: predicates(p)?,
    }))
}

fn node_test(name: &str) -> NodeTest {
    if name == "*" {
        NodeTest::Any
    } else if name.contains(['*', '?']) {
        NodeTest::Name(NamePattern::new(name))
    } else {
        NodeTest::TypeName(name.to_string())
    }
}

/// ```txt
/// predicate ::= '[' orExpr ']'
/// ```
fn predicates(p: &mut Parser) -> Result<Vec<PredExpr>, ParseError> {
    let mut predicates = Vec::new();
    while p.eat(TokenKind::LBracket) {
        predicates.push(predicate::or_expr(p)?);
        p.expect(TokenKind::RBracket, "`]`")?;
    }
    Ok(predicates)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn parse(input: &str) -> PathExpr {
        Parser::new(input).parse().unwrap()
    }

    fn round_trip(input: &str) {
        let path = parse(input);
        assert_eq!(path.to_string(), input);
        assert_eq!(Parser::new(&path.to_string()).parse().unwrap(), path);
    }

    #[test]
    fn separators_choose_the_axis() {
        let path = parse("//class/method");
        assert_eq!(path.anchor, Anchor::Absolute);
        assert_eq!(path.steps[0].axis, Axis::DescendantOrSelf);
        assert_eq!(path.steps[1].axis, Axis::Child);

        let relative = parse("method/statement");
        assert_eq!(relative.anchor, Anchor::Relative);
        assert_eq!(relative.steps[0].axis, Axis::Child);
    }

    #[test]
    fn explicit_axes() {
        let path = parse("ancestor::class/following-sibling::*");
        assert_eq!(path.steps[0].axis, Axis::Ancestor);
        assert_eq!(
            path.steps[0].node_test,
            NodeTest::TypeName("class".to_string()),
        );
        assert_eq!(path.steps[1].axis, Axis::FollowingSibling);
        assert_eq!(path.steps[1].node_test, NodeTest::Any);
    }

    #[test]
    fn unknown_axis_is_rejected() {
        let error = Parser::new("sideways::*").parse().unwrap_err();
        assert_eq!(error.message(), "unknown axis `sideways`");
    }

    #[test]
    fn dots_desugar_to_self_and_parent() {
        let path = parse("./..");
        assert_eq!(path.steps[0].axis, Axis::SelfNode);
        assert_eq!(path.steps[0].node_test, NodeTest::Any);
        assert_eq!(path.steps[1].axis, Axis::Parent);
        assert_eq!(path.steps[1].node_test, NodeTest::Any);
    }

    #[test]
    fn wildcard_node_test_matches_names() {
        let path = parse("//method/Get*");
        assert_eq!(
            path.steps[1].node_test,
            NodeTest::Name(NamePattern::new("Get*")),
        );
    }

    #[test]
    fn bare_root_query() {
        let path = parse("/");
        assert_eq!(path.anchor, Anchor::Absolute);
        assert!(path.steps.is_empty());
    }

    #[test]
    fn dangling_separators_are_rejected() {
        assert!(Parser::new("//").parse().is_err());
        assert!(Parser::new("class/").parse().is_err());
        assert!(Parser::new("").parse().is_err());
    }

    #[test]
    fn wildcard_with_predicate_terminates() {
        // regression guard: this query once looped forever mid-parse
        let path = parse("//*[@name='foo']");
        assert_eq!(path.steps.len(), 1);
        assert_eq!(path.steps[0].node_test, NodeTest::Any);
        assert_eq!(path.steps[0].predicates.len(), 1);
    }

    #[test]
    fn trailing_garbage_is_rejected() {
        let error = Parser::new("//class)").parse().unwrap_err();
        assert!(error.message().contains("expected end of query"));
    }

    #[test]
    fn display_round_trips() {
        round_trip("/");
        round_trip("//class[B]/method[F]");
        round_trip("//method[@async and not(.//await-expression)]");
        round_trip("ancestor-or-self::*");
        round_trip("../block[1]");
        round_trip(".//throw-statement");
        round_trip("//statement[@contains='== null']");
        round_trip("//method/statement[last()-1]");
    }
}
