//! The evaluator's quantified guarantees: determinism, ordering,
//! short-circuiting, graceful degradation.

use pretty_assertions::assert_eq;
use spelunk_engine::evaluate;
use spelunk_engine::Cancellation;
use spelunk_engine::EvalError;
use spelunk_engine::EvalWarning;
use spelunk_engine::Evaluator;
use spelunk_path::ast::PathExpr;

use crate::fixture::eval;
use crate::fixture::node;
use crate::fixture::TreeHost;

fn class_tree() -> TreeHost {
    TreeHost::new(
        node("compilation").child(
            node("class").name("C")
                .child(
                    node("method").name("A").attr("async", true)
                        .attr("modifiers", "public async")
                        .child(node("expression-statement").name("a1").text("x == null"))
                        .child(node("expression-statement").name("a2").text("y = 1;")),
                )
                .child(
                    node("method").name("B").attr("static", true)
                        .attr("modifiers", "private static")
                        .child(node("expression-statement").name("b1").text("x==null"))
                        .child(node("expression-statement").name("b2").text("x  ==  null"))
                        .child(node("expression-statement").name("b3").text("z();")),
                ),
        ),
    )
}

#[test]
fn evaluation_is_deterministic() {
    let host = class_tree();
    let query = "//method[@async or @static]/statement[last()]";
    assert_eq!(eval(&host, query), eval(&host, query));
}

#[test]
fn results_are_in_document_order_without_duplicates() {
    let host = class_tree();
    // every node is reachable through both descendant expansions, many of
    // them through several origins; each must come back exactly once
    let result = eval(&host, "//*//*");
    let mut sorted = result.clone();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(result, sorted);
    assert_eq!(result.len(), host.node_count());
}

#[test]
fn and_short_circuits_on_a_false_left_side() {
    let host = class_tree();
    host.clear_attribute_log();
    eval(&host, "//method[A][@missing and @static]");
    assert_eq!(host.attribute_lookups(), vec!["missing".to_string()]);
}

#[test]
fn or_short_circuits_on_a_true_left_side() {
    let host = class_tree();
    host.clear_attribute_log();
    eval(&host, "//method[A][@async or @static]");
    assert_eq!(host.attribute_lookups(), vec!["async".to_string()]);
}

#[test]
fn contains_ignores_whitespace_on_both_sides() {
    let host = class_tree();
    let statements = eval(&host, "//statement[@contains='== null']");
    assert_eq!(
        statements,
        vec![
            host.id_by_name("a1"),
            host.id_by_name("b1"),
            host.id_by_name("b2"),
        ],
    );
}

#[test]
fn statement_test_excludes_raw_blocks() {
    let host = TreeHost::new(node("block"));
    assert_eq!(eval(&host, "//statement"), Vec::<usize>::new());
    assert_eq!(eval(&host, "//block"), vec![0]);
}

#[test]
fn positions_select_within_each_origin() {
    let host = class_tree();
    assert_eq!(
        eval(&host, "//method/statement[1]"),
        vec![host.id_by_name("a1"), host.id_by_name("b1")],
    );
    assert_eq!(
        eval(&host, "//method/statement[last()]"),
        vec![host.id_by_name("a2"), host.id_by_name("b3")],
    );
    assert_eq!(
        eval(&host, "//method/statement[last()-1]"),
        vec![host.id_by_name("a1"), host.id_by_name("b2")],
    );
    // out of range is empty, not an error
    assert_eq!(eval(&host, "//method/statement[7]"), Vec::<usize>::new());
    assert_eq!(
        eval(&host, "//method/statement[last()-9]"),
        Vec::<usize>::new(),
    );
}

#[test]
fn position_comparisons_nest_in_boolean_predicates() {
    let host = class_tree();
    assert_eq!(
        eval(&host, "//method[B]/statement[position()>1 and @contains='null']"),
        vec![host.id_by_name("b2")],
    );
}

#[test]
fn attribute_globs_and_modifier_sets() {
    let host = class_tree();
    assert_eq!(
        eval(&host, "//method[@name='?']"),
        vec![host.id_by_name("A"), host.id_by_name("B")],
    );
    assert_eq!(
        eval(&host, "//method[@modifiers~='async']"),
        vec![host.id_by_name("A")],
    );
    // for `@modifiers`, `~=` is membership in the modifier set, so a
    // fragment of a modifier does not match
    assert_eq!(
        eval(&host, "//method[@modifiers~='stat']"),
        Vec::<usize>::new(),
    );
}

#[test]
fn bad_regex_warns_and_matches_nothing() {
    let host = class_tree();
    let path: PathExpr = "//statement[@matches='(']".parse().unwrap();
    let result = evaluate(&path, &host).unwrap();
    assert!(result.nodes.is_empty());
    assert_eq!(result.warnings.len(), 1);
    let EvalWarning::BadRegex { step, pattern, .. } = &result.warnings[0];
    assert_eq!(*step, 0);
    assert_eq!(pattern, "(");
}

#[test]
fn good_regex_matches_normalized_text() {
    let host = class_tree();
    assert_eq!(
        eval(&host, "//statement[@matches='^x\\s*==']"),
        vec![
            host.id_by_name("a1"),
            host.id_by_name("b1"),
            host.id_by_name("b2"),
        ],
    );
}

#[test]
fn cancellation_returns_the_partial_frontier() {
    let host = class_tree();
    let token = Cancellation::new();
    token.cancel();
    let path: PathExpr = "//method/statement".parse().unwrap();
    let error = Evaluator::new(&host)
        .cancellation(token)
        .evaluate(&path)
        .unwrap_err();
    let EvalError::Cancelled { partial } = error else {
        panic!("expected a cancellation");
    };
    assert_eq!(partial, vec![0]);
}

#[test]
fn reusing_one_path_across_trees() {
    let path: PathExpr = "//method[Get*]".parse().unwrap();
    let one = TreeHost::new(node("compilation").child(node("method").name("GetUser")));
    let two = TreeHost::new(node("compilation").child(node("method").name("SetUser")));
    assert_eq!(evaluate(&path, &one).unwrap().nodes.len(), 1);
    assert_eq!(evaluate(&path, &two).unwrap().nodes.len(), 0);
}
