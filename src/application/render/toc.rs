use super::types::{TocItem, TocNode};

/// Nest a flat table of contents by heading level.
///
/// A heading becomes a child of the closest preceding heading with a smaller
/// level; skipped levels (an `h4` directly under an `h2`) nest directly.
pub fn toc_tree(items: &[TocItem]) -> Vec<TocNode> {
    let mut roots: Vec<TocNode> = Vec::new();
    // Open ancestors, outermost first.
    let mut stack: Vec<TocNode> = Vec::new();

    for item in items {
        while stack.last().is_some_and(|open| open.level >= item.level) {
            close_top(&mut stack, &mut roots);
        }
        stack.push(TocNode {
            id: item.id.clone(),
            text: item.text.clone(),
            level: item.level,
            children: Vec::new(),
        });
    }

    while !stack.is_empty() {
        close_top(&mut stack, &mut roots);
    }

    roots
}

fn close_top(stack: &mut Vec<TocNode>, roots: &mut Vec<TocNode>) {
    if let Some(node) = stack.pop() {
        match stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => roots.push(node),
        }
    }
}
