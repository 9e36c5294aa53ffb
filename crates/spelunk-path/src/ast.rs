//! Path and predicate expression types.
//!
//! Purely structural: the parser builds these, the evaluation engine walks
//! them, nothing here evaluates anything. A parsed path is immutable and
//! `Send + Sync`, so one `PathExpr` can serve any number of trees.
//!
//! Every type implements `Display`, rendering a canonical query string that
//! parses back to an equal AST.

use std::fmt;
use std::str::FromStr;

use crate::NamePattern;
use crate::ParseError;
use crate::Parser;

/// A parsed SpelunkPath query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathExpr {
    pub anchor: Anchor,
    pub steps: Vec<Step>,
}

impl PathExpr {
    /// Parses a query with default parser settings.
    pub fn parse(query: &str) -> Result<PathExpr, ParseError> {
        Parser::new(query).parse()
    }
}

impl FromStr for PathExpr {
    type Err = ParseError;

    fn from_str(query: &str) -> Result<PathExpr, ParseError> {
        PathExpr::parse(query)
    }
}

/// Where a path starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Leading `/` or `//`: the path starts at the tree root.
    Absolute,
    /// No leading slash: the path starts at the context node.
    Relative,
}

/// One step of a path: an axis, a node test, and any number of predicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub axis: Axis,
    pub node_test: NodeTest,
    pub predicates: Vec<PredExpr>,
}

/// Direction relation from a context node to its candidate set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Child,
    Descendant,
    /// The `//` separator: the origin and every descendant of it.
    DescendantOrSelf,
    Parent,
    SelfNode,
    Ancestor,
    AncestorOrSelf,
    FollowingSibling,
    PrecedingSibling,
}

impl Axis {
    /// The `axis::` spelling used in queries.
    pub fn name(self) -> &'static str {
        match self {
            Axis::Child => "child",
            Axis::Descendant => "descendant",
            Axis::DescendantOrSelf => "descendant-or-self",
            Axis::Parent => "parent",
            Axis::SelfNode => "self",
            Axis::Ancestor => "ancestor",
            Axis::AncestorOrSelf => "ancestor-or-self",
            Axis::FollowingSibling => "following-sibling",
            Axis::PrecedingSibling => "preceding-sibling",
        }
    }

    pub(crate) fn from_name(name: &str) -> Option<Axis> {
        Some(match name {
            "child" => Axis::Child,
            "descendant" => Axis::Descendant,
            "descendant-or-self" => Axis::DescendantOrSelf,
            "parent" => Axis::Parent,
            "self" => Axis::SelfNode,
            "ancestor" => Axis::Ancestor,
            "ancestor-or-self" => Axis::AncestorOrSelf,
            "following-sibling" => Axis::FollowingSibling,
            "preceding-sibling" => Axis::PrecedingSibling,
            _ => return None,
        })
    }
}

/// Constraint on the candidates of a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeTest {
    /// `*`: any node.
    Any,
    /// A canonical node-type name such as `method` or `if-statement`.
    TypeName(String),
    /// A wildcard pattern matched against the node *name*, not its type.
    Name(NamePattern),
}

/// A predicate expression inside `[...]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredExpr {
    Or(Box<PredExpr>, Box<PredExpr>),
    And(Box<PredExpr>, Box<PredExpr>),
    Not(Box<PredExpr>),
    /// Positional selection within the candidate collection.
    Position(PositionTest),
    /// `@name`, optionally compared against a literal.
    Attribute {
        name: String,
        cmp: Option<(CmpOp, AttrLiteral)>,
    },
    /// A nested path; truthy iff it selects at least one node.
    Path(PathExpr),
    /// A bare name or pattern: matches the node name.
    Name(NamePattern),
}

/// The positional predicate family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionTest {
    /// `[3]` or `position()=3`: the k-th candidate, 1-based.
    At(i64),
    /// `first()`
    First,
    /// `last()` or `last()-k`
    Last { offset: i64 },
    /// `position() <op> n` for the remaining comparison operators.
    Cmp { op: CmpOp, value: i64 },
}

/// Comparison operators usable in predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Eq,
    Ne,
    /// `~=`: substring containment, or set membership for `@modifiers`.
    Contains,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CmpOp::Eq => "=",
            CmpOp::Ne => "!=",
            CmpOp::Contains => "~=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        }
    }
}

/// Right-hand side of an attribute comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrLiteral {
    Str(String),
    Number(i64),
}

impl fmt::Display for PathExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return match self.anchor {
                Anchor::Absolute => f.write_str("/"),
                Anchor::Relative => Ok(()),
            };
        }
        for (i, step) in self.steps.iter().enumerate() {
            let first = i == 0;
            // `//` renders the descendant-or-self separator, except for a
            // relative path's first step where it would read as absolute
            if step.axis == Axis::DescendantOrSelf && !(first && self.anchor == Anchor::Relative) {
                f.write_str("//")?;
                write_step(f, step, false)?;
            } else {
                if !first || self.anchor == Anchor::Absolute {
                    f.write_str("/")?;
                }
                write_step(f, step, true)?;
            }
        }
        Ok(())
    }
}

fn write_step(f: &mut fmt::Formatter<'_>, step: &Step, with_axis: bool) -> fmt::Result {
    if step.predicates.is_empty() {
        match (step.axis, &step.node_test) {
            (Axis::SelfNode, NodeTest::Any) => return f.write_str("."),
            (Axis::Parent, NodeTest::Any) => return f.write_str(".."),
            _ => {}
        }
    }
    if with_axis && step.axis != Axis::Child {
        write!(f, "{}::", step.axis.name())?;
    }
    write!(f, "{}", step.node_test)?;
    for predicate in &step.predicates {
        write!(f, "[{predicate}]")?;
    }
    Ok(())
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_step(f, self, true)
    }
}

impl fmt::Display for NodeTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeTest::Any => f.write_str("*"),
            NodeTest::TypeName(name) => f.write_str(name),
            NodeTest::Name(pattern) => write!(f, "{pattern}"),
        }
    }
}

impl fmt::Display for PredExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_pred(f, self, false)
    }
}

/// `in_and`: whether the surrounding context binds as tightly as `and`, in
/// which case an `or` child needs parentheses.
fn write_pred(f: &mut fmt::Formatter<'_>, pred: &PredExpr, in_and: bool) -> fmt::Result {
    match pred {
        PredExpr::Or(lhs, rhs) => {
            if in_and {
                f.write_str("(")?;
            }
            write_pred(f, lhs, false)?;
            f.write_str(" or ")?;
            write_pred(f, rhs, false)?;
            if in_and {
                f.write_str(")")?;
            }
            Ok(())
        }
        PredExpr::And(lhs, rhs) => {
            write_pred(f, lhs, true)?;
            f.write_str(" and ")?;
            write_pred(f, rhs, true)
        }
        PredExpr::Not(inner) => {
            f.write_str("not(")?;
            write_pred(f, inner, false)?;
            f.write_str(")")
        }
        PredExpr::Position(test) => write!(f, "{test}"),
        PredExpr::Attribute { name, cmp } => {
            write!(f, "@{name}")?;
            if let Some((op, literal)) = cmp {
                write!(f, "{}{literal}", op.symbol())?;
            }
            Ok(())
        }
        PredExpr::Path(path) => write!(f, "{path}"),
        PredExpr::Name(pattern) => write!(f, "{pattern}"),
    }
}

impl fmt::Display for PositionTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionTest::At(k) => write!(f, "{k}"),
            PositionTest::First => f.write_str("first()"),
            PositionTest::Last { offset: 0 } => f.write_str("last()"),
            PositionTest::Last { offset } => write!(f, "last()-{offset}"),
            PositionTest::Cmp { op, value } => write!(f, "position(){}{value}", op.symbol()),
        }
    }
}

impl fmt::Display for AttrLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrLiteral::Str(value) => {
                f.write_str("'")?;
                for c in value.chars() {
                    if c == '\'' || c == '\\' {
                        f.write_str("\\")?;
                    }
                    write!(f, "{c}")?;
                }
                f.write_str("'")
            }
            AttrLiteral::Number(value) => write!(f, "{value}"),
        }
    }
}
