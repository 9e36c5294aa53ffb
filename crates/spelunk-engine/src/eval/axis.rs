//! Axis expansion.
//!
//! Each function returns candidates in document order relative to one
//! origin; the step loop restores cross-origin ordering afterwards.

use spelunk_path::ast::Axis;

use crate::host::SyntaxHost;

pub(super) fn expand<H: SyntaxHost>(
    host: &H,
    axis: Axis,
    origin: &H::Node,
) -> Result<Vec<H::Node>, H::Error> {
    match axis {
        Axis::Child => host.children(origin),
        Axis::SelfNode => Ok(vec![origin.clone()]),
        Axis::Parent => Ok(host.parent(origin)?.into_iter().collect()),
        Axis::Descendant => descendants(host, origin, false),
        Axis::DescendantOrSelf => descendants(host, origin, true),
        Axis::Ancestor => ancestors(host, origin, false),
        Axis::AncestorOrSelf => ancestors(host, origin, true),
        Axis::FollowingSibling => siblings(host, origin, Direction::Following),
        Axis::PrecedingSibling => siblings(host, origin, Direction::Preceding),
    }
}

/// Pre-order walk with an explicit stack: scratch space stays proportional
/// to tree depth, not tree size.
fn descendants<H: SyntaxHost>(
    host: &H,
    origin: &H::Node,
    include_self: bool,
) -> Result<Vec<H::Node>, H::Error> {
    let mut result = Vec::new();
    if include_self {
        result.push(origin.clone());
    }
    let mut stack = host.children(origin)?;
    stack.reverse();
    while let Some(node) = stack.pop() {
        let mut children = host.children(&node)?;
        children.reverse();
        result.push(node);
        stack.append(&mut children);
    }
    Ok(result)
}

fn ancestors<H: SyntaxHost>(
    host: &H,
    origin: &H::Node,
    include_self: bool,
) -> Result<Vec<H::Node>, H::Error> {
    let mut result = Vec::new();
    if include_self {
        result.push(origin.clone());
    }
    let mut current = host.parent(origin)?;
    while let Some(node) = current {
        current = host.parent(&node)?;
        result.push(node);
    }
    // collected innermost-first; document order is outermost-first
    result.reverse();
    Ok(result)
}

enum Direction {
    Following,
    Preceding,
}

fn siblings<H: SyntaxHost>(
    host: &H,
    origin: &H::Node,
    direction: Direction,
) -> Result<Vec<H::Node>, H::Error> {
    let Some(parent) = host.parent(origin)? else {
        return Ok(Vec::new());
    };
    let children = host.children(&parent)?;
    let Some(position) = children.iter().position(|child| child == origin) else {
        return Ok(Vec::new());
    };
    Ok(match direction {
        Direction::Following => children[position + 1..].to_vec(),
        Direction::Preceding => children[..position].to_vec(),
    })
}
