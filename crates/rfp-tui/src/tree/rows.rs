use rfp_shared::NodeKind;

use super::{Node, NodeId, Tree, ViewState};

#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    pub node: &'a Node,
    pub depth: usize,
    pub kind: NodeKind,
}

/// Depth-first pre-order walk over the visible part of a tree.
///
/// Folders are always yielded; their children only when expanded. Files are
/// yielded when the filter is empty or their name contains it, ignoring case.
/// A collapsed folder's subtree is never visited, so matches inside it stay
/// hidden. The iterator is `Clone`; cloning a fresh one restarts the walk.
#[derive(Debug, Clone)]
pub struct Rows<'a> {
    tree: &'a Tree,
    state: &'a ViewState,
    filter: String,
    stack: Vec<(NodeId, usize)>,
}

impl<'a> Rows<'a> {
    pub fn new(tree: &'a Tree, state: &'a ViewState, filter: &str) -> Self {
        let stack = tree.roots().iter().rev().map(|&id| (id, 0)).collect();
        Self {
            tree,
            state,
            filter: filter.to_lowercase(),
            stack,
        }
    }

    fn matches(&self, node: &Node) -> bool {
        self.filter.is_empty() || node.name.to_lowercase().contains(&self.filter)
    }
}

impl<'a> Iterator for Rows<'a> {
    type Item = Row<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((id, depth)) = self.stack.pop() {
            let node = self.tree.node(id);
            match node.kind {
                NodeKind::Folder => {
                    if self.state.is_expanded(&node.id) {
                        self.stack
                            .extend(node.children.iter().rev().map(|&c| (c, depth + 1)));
                    }
                    return Some(Row {
                        node,
                        depth,
                        kind: NodeKind::Folder,
                    });
                }
                NodeKind::File if self.matches(node) => {
                    return Some(Row {
                        node,
                        depth,
                        kind: NodeKind::File,
                    });
                }
                NodeKind::File => {}
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{fixtures, sort_nodes};

    fn names(rows: Rows<'_>) -> Vec<(String, usize)> {
        rows.map(|r| (r.node.name.clone(), r.depth)).collect()
    }

    #[test]
    fn collapsed_tree_yields_only_roots() {
        let tree = Tree::from_nodes(fixtures::six_node_tree()).unwrap();
        let state = ViewState::default();

        let rows: Vec<Row<'_>> = Rows::new(&tree, &state, "").collect();

        assert_eq!(rows.len(), tree.roots().len());
        assert!(rows.iter().all(|r| r.depth == 0));
    }

    #[test]
    fn filter_keeps_folders_and_matching_files() {
        let tree = Tree::from_nodes(fixtures::six_node_tree()).unwrap();
        let mut state = ViewState::default();
        state.toggle_expansion(&tree, "f1");

        let rows = names(Rows::new(&tree, &state, "report"));

        assert_eq!(
            rows,
            vec![
                ("Proposals".to_string(), 0),
                ("Q4_report.pdf".to_string(), 1),
                ("Archive".to_string(), 0),
            ]
        );
    }

    #[test]
    fn filter_ignores_case() {
        let tree = Tree::from_nodes(fixtures::six_node_tree()).unwrap();
        let mut state = ViewState::default();
        state.toggle_expansion(&tree, "f1");

        let rows = names(Rows::new(&tree, &state, "REPORT"));

        assert!(rows.iter().any(|(name, _)| name == "Q4_report.pdf"));
        assert!(!rows.iter().any(|(name, _)| name == "notes.txt"));
    }

    #[test]
    fn collapsed_folder_hides_matches_inside() {
        let tree = Tree::from_nodes(fixtures::six_node_tree()).unwrap();
        let state = ViewState::default();

        let rows = names(Rows::new(&tree, &state, "report"));

        assert_eq!(rows, vec![("Proposals".to_string(), 0), ("Archive".to_string(), 0)]);
    }

    #[test]
    fn depth_grows_by_one_per_level_in_preorder() {
        let nodes = sort_nodes(&[rfp_shared::TreeNode::folder(
            "a",
            "A",
            vec![
                rfp_shared::TreeNode::folder(
                    "b",
                    "B",
                    vec![rfp_shared::TreeNode::file("c", "c.pdf", None)],
                ),
                rfp_shared::TreeNode::file("d", "d.pdf", None),
            ],
        )]);
        let tree = Tree::from_nodes(nodes).unwrap();
        let mut state = ViewState::default();
        state.toggle_expansion(&tree, "a");
        state.toggle_expansion(&tree, "b");

        let rows = names(Rows::new(&tree, &state, ""));

        assert_eq!(
            rows,
            vec![
                ("A".to_string(), 0),
                ("B".to_string(), 1),
                ("c.pdf".to_string(), 2),
                ("d.pdf".to_string(), 1),
            ]
        );
    }

    #[test]
    fn cloned_iterator_restarts() {
        let tree = Tree::from_nodes(fixtures::six_node_tree()).unwrap();
        let state = ViewState::default();
        let rows = Rows::new(&tree, &state, "");

        let first: Vec<_> = rows.clone().map(|r| r.node.id.clone()).collect();
        let second: Vec<_> = rows.map(|r| r.node.id.clone()).collect();

        assert_eq!(first, second);
    }
}
