//! Stable, edit-surviving node identifiers.
//!
//! A stable path reads `/compilation/class/method/block[1]/expression[1]`:
//! one segment per ancestor, root first. Semantic containers render as a
//! bare type name; structural nodes as `type[N]`, `N` being the 1-based
//! index among siblings of the same type. Navigation and marker features
//! re-locate nodes through these paths after edits that leave the named
//! structure alone.

use crate::host::SyntaxHost;
use crate::host::SEMANTIC_CONTAINERS;

/// Renders the stable path of `node`.
pub fn stable_path<H: SyntaxHost>(host: &H, node: &H::Node) -> Result<String, H::Error> {
    let mut segments = Vec::new();
    let mut current = node.clone();
    loop {
        segments.push(segment(host, &current)?);
        match host.parent(&current)? {
            Some(parent) => current = parent,
            None => break,
        }
    }
    segments.reverse();
    let mut path = String::new();
    for segment in &segments {
        path.push('/');
        path.push_str(segment);
    }
    Ok(path)
}

fn segment<H: SyntaxHost>(host: &H, node: &H::Node) -> Result<String, H::Error> {
    let ty = host.node_type(node)?;
    if SEMANTIC_CONTAINERS.contains(&ty.as_str()) {
        return Ok(ty);
    }
    let index = match host.parent(node)? {
        Some(parent) => {
            let mut nth = 0;
            for sibling in host.children(&parent)? {
                if host.node_type(&sibling)? == ty {
                    nth += 1;
                }
                if &sibling == node {
                    break;
                }
            }
            nth
        }
        None => 1,
    };
    Ok(format!("{ty}[{index}]"))
}
