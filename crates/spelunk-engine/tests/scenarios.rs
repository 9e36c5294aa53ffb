//! End-to-end scenarios over canonical C#-shaped trees.

use pretty_assertions::assert_eq;

use crate::fixture::eval;
use crate::fixture::node;
use crate::fixture::TreeHost;

/// `class C { void M() { if (x == null) throw new E(); } }`
fn null_check_tree() -> TreeHost {
    TreeHost::new(
        node("compilation").child(
            node("class").name("C").child(
                node("method").name("M").child(
                    node("block").child(
                        node("if-statement").text("if (x == null) throw new E();").child(
                            node("binary-expression")
                                .text("x == null")
                                .attr("operator", "==")
                                .attr("left-text", "x")
                                .attr("right-text", "null"),
                        ).child(
                            node("throw-statement").text("throw new E();"),
                        ),
                    ),
                ),
            ),
        ),
    )
}

#[test]
fn finds_the_null_comparison_inside_a_method() {
    let host = null_check_tree();
    let result = eval(
        &host,
        "//method[M]//if-statement/binary-expression[@operator='==' and @right-text='null']",
    );
    assert_eq!(result, host.ids_by_type("binary-expression"));
    assert_eq!(result.len(), 1);
}

#[test]
fn name_predicates_distinguish_identical_members() {
    // class A { void F() {} }  class B { void F() {} }
    let host = TreeHost::new(
        node("compilation")
            .child(node("class").name("A").child(node("method").name("F")))
            .child(node("class").name("B").child(node("method").name("F"))),
    );
    let result = eval(&host, "//class[B]/method[F]");
    let b = host.id_by_name("B");
    assert_eq!(result.len(), 1);
    assert_eq!(result, vec![b + 1]);
}

#[test]
fn last_minus_one_selects_the_penultimate_statement() {
    // void M() { s1; s2; s3; }
    let host = TreeHost::new(
        node("compilation").child(
            node("method").name("M")
                .child(node("expression-statement").name("s1").text("s1;"))
                .child(node("expression-statement").name("s2").text("s2;"))
                .child(node("expression-statement").name("s3").text("s3;")),
        ),
    );
    let result = eval(&host, "//method/statement[last()-1]");
    assert_eq!(result, vec![host.id_by_name("s2")]);
}

#[test]
fn async_methods_without_awaits() {
    let host = TreeHost::new(
        node("compilation")
            .child(
                node("method").name("M").attr("async", true).child(
                    node("block").child(node("return-statement").text("return 1;")),
                ),
            )
            .child(
                node("method").name("N").attr("async", true).child(
                    node("block").child(
                        node("expression-statement")
                            .child(node("await-expression").text("await Task.Delay(1)")),
                    ),
                ),
            )
            .child(node("method").name("O")),
    );
    let result = eval(&host, "//method[@async and not(.//await-expression)]");
    assert_eq!(result, vec![host.id_by_name("M")]);
}

#[test]
fn name_globs_select_prefixed_methods() {
    let host = TreeHost::new(
        node("compilation").child(
            node("class").name("C")
                .child(node("method").name("Get"))
                .child(node("method").name("GetUser"))
                .child(node("method").name("SetValue")),
        ),
    );
    let result = eval(&host, "//method[Get*]");
    assert_eq!(
        result,
        vec![host.id_by_name("Get"), host.id_by_name("GetUser")],
    );
}

#[test]
fn empty_tree_yields_empty_not_error() {
    let host = TreeHost::new(node("compilation"));
    assert_eq!(eval(&host, "//*[@name='foo']"), Vec::<usize>::new());
}
