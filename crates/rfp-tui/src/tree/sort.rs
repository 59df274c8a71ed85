use std::cmp::Ordering;

use rfp_shared::{NodeKind, TreeNode};

/// Return a sorted copy of a sibling group, recursing into every folder.
///
/// Folders come first, by name ascending. Files follow, most recently
/// uploaded first; a missing `uploaded_at` compares as the empty string and
/// so sinks to the end. The sort is stable, so equal keys keep their input
/// order and sorting twice changes nothing.
pub fn sort_nodes(nodes: &[TreeNode]) -> Vec<TreeNode> {
    let mut sorted: Vec<TreeNode> = nodes
        .iter()
        .map(|node| TreeNode {
            children: sort_nodes(&node.children),
            ..node.clone()
        })
        .collect();
    sorted.sort_by(compare_siblings);
    sorted
}

fn compare_siblings(a: &TreeNode, b: &TreeNode) -> Ordering {
    match (a.kind, b.kind) {
        (NodeKind::Folder, NodeKind::File) => Ordering::Less,
        (NodeKind::File, NodeKind::Folder) => Ordering::Greater,
        (NodeKind::Folder, NodeKind::Folder) => a.name.cmp(&b.name),
        (NodeKind::File, NodeKind::File) => upload_key(b).cmp(upload_key(a)),
    }
}

fn upload_key(node: &TreeNode) -> &str {
    node.uploaded_at.as_deref().unwrap_or("")
}
