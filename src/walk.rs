//! Depth-first traversal with entering/exiting events.

use crate::ast::NodeRef;
use crate::error::Result;

/// What the walker should do after a visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WalkStatus {
    /// Continue with the next node in document order.
    #[default]
    GoToNext,
    /// Do not descend into this node. Its exiting visit is skipped too.
    SkipChildren,
    /// Stop the whole walk.
    Terminate,
}

/// Visit `root` and all of its descendants in document order.
///
/// Containers are visited with `entering == true` before their children and
/// `entering == false` after them; leaves are visited once, entering. The
/// walk is iterative, so deeply nested trees do not grow the call stack.
///
/// Returns [`WalkStatus::Terminate`] if the visitor stopped the walk and
/// [`WalkStatus::GoToNext`] otherwise. A visitor error aborts the walk.
pub fn walk<'t, F>(root: NodeRef<'t>, mut visitor: F) -> Result<WalkStatus>
where
    F: FnMut(NodeRef<'t>, bool) -> Result<WalkStatus>,
{
    let mut current = Some(root);
    let mut entering = true;

    while let Some(node) = current {
        match visitor(node, entering)? {
            WalkStatus::GoToNext => {}
            WalkStatus::SkipChildren => entering = false,
            WalkStatus::Terminate => return Ok(WalkStatus::Terminate),
        }

        // Advance the cursor.
        if (!node.is_container() || !entering) && node == root {
            break;
        }
        if entering && node.is_container() {
            match node.first_child() {
                Some(child) => current = Some(child),
                None => entering = false,
            }
        } else if let Some(next) = node.next() {
            current = Some(next);
            entering = true;
        } else {
            current = node.parent();
            entering = false;
        }
    }

    Ok(WalkStatus::GoToNext)
}
