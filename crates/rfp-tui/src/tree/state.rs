use std::collections::HashSet;

use rfp_shared::TreeNode;

use super::Tree;

/// Expansion and selection, keyed by node id and independent of sort order.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    expanded: HashSet<String>,
    selected: HashSet<String>,
}

impl ViewState {
    /// Replace the expansion set with the folders a snapshot marks as expanded.
    pub fn reset_expansion(&mut self, nodes: &[TreeNode]) {
        self.expanded.clear();
        let mut stack: Vec<&TreeNode> = nodes.iter().collect();
        while let Some(node) = stack.pop() {
            if node.is_folder() && node.expanded {
                self.expanded.insert(node.id.clone());
            }
            stack.extend(node.children.iter());
        }
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    /// Flip the expansion of a folder. Returns false, changing nothing, when
    /// `id` is not a folder in `tree`.
    pub fn toggle_expansion(&mut self, tree: &Tree, id: &str) -> bool {
        if !tree.is_folder(id) {
            return false;
        }
        if !self.expanded.remove(id) {
            self.expanded.insert(id.to_string());
        }
        true
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn toggle_selection(&mut self, id: &str) {
        if !self.selected.remove(id) {
            self.selected.insert(id.to_string());
        }
    }

    /// Select every node in the tree, or clear the selection.
    pub fn select_all(&mut self, tree: &Tree, checked: bool) {
        self.selected.clear();
        if checked {
            self.selected.extend(tree.ids().map(str::to_string));
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    pub fn selection_len(&self) -> usize {
        self.selected.len()
    }

    /// Selected ids in a stable order.
    pub fn selected_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.selected.iter().cloned().collect();
        ids.sort();
        ids
    }

    pub fn selection(&self) -> &HashSet<String> {
        &self.selected
    }

    /// Forget selected ids that are no longer in the tree.
    pub fn retain_existing(&mut self, tree: &Tree) {
        self.selected.retain(|id| tree.contains(id));
        self.expanded.retain(|id| tree.contains(id));
    }
}
