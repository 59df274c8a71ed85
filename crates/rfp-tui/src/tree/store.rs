use rfp_shared::{ParsingStatus, TreeNode};

use super::{sort_nodes, Rows, Tree, TreeError, ViewState};
use crate::api::{ApiError, DocumentApi};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("Malformed document tree: {0}")]
    Tree(#[from] TreeError),
}

/// Ids awaiting a yes/no answer before they are deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDelete {
    pub(crate) ids: Vec<String>,
    includes_folder: bool,
}

impl PendingDelete {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn prompt(&self) -> String {
        let noun = if self.ids.len() == 1 { "item" } else { "items" };
        if self.includes_folder {
            format!(
                "Delete {} {}? Folders are removed with everything inside them.",
                self.ids.len(),
                noun
            )
        } else {
            format!("Delete {} {}?", self.ids.len(), noun)
        }
    }
}

/// Owns the tree snapshot and the view state layered over it.
#[derive(Debug, Default)]
pub struct DocumentStore {
    tree: Tree,
    state: ViewState,
    loaded: bool,
    load_attempted: bool,
    clear_selection_on_ack: bool,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// False until the first successful load.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// True once any load has finished, successful or not.
    pub fn load_attempted(&self) -> bool {
        self.load_attempted
    }

    pub fn rows(&self, filter: &str) -> Rows<'_> {
        Rows::new(&self.tree, &self.state, filter)
    }

    /// Fetch a fresh snapshot. On failure the current tree stays in place.
    pub async fn reload<A: DocumentApi + ?Sized>(&mut self, api: &A) -> Result<(), StoreError> {
        let result = match api.get_tree().await {
            Ok(nodes) => self.replace(nodes).map_err(StoreError::from),
            Err(e) => Err(e.into()),
        };
        self.load_attempted = true;
        match &result {
            Ok(()) => tracing::debug!(nodes = self.tree.len(), "Document tree loaded"),
            Err(e) => tracing::error!("Failed to load document tree: {}", e),
        }
        result
    }

    /// Install a snapshot: sort it, validate it, reset expansion.
    pub fn replace(&mut self, nodes: Vec<TreeNode>) -> Result<(), TreeError> {
        let sorted = sort_nodes(&nodes);
        let tree = Tree::from_nodes(sorted)?;
        self.state.reset_expansion(&nodes);
        self.tree = tree;
        self.state.retain_existing(&self.tree);
        self.loaded = true;
        Ok(())
    }

    pub fn toggle_expansion(&mut self, id: &str) -> bool {
        self.state.toggle_expansion(&self.tree, id)
    }

    pub fn toggle_selection(&mut self, id: &str) {
        self.state.toggle_selection(id);
    }

    pub fn select_all(&mut self, checked: bool) {
        self.state.select_all(&self.tree, checked);
    }

    pub fn all_selected(&self) -> bool {
        !self.tree.is_empty() && self.state.selection_len() == self.tree.len()
    }

    pub fn selected_ids(&self) -> Vec<String> {
        self.state.selected_ids()
    }

    pub fn prepare_delete(&self) -> Option<PendingDelete> {
        let ids = self.state.selected_ids();
        if ids.is_empty() {
            return None;
        }
        let includes_folder = ids.iter().any(|id| self.tree.is_folder(id));
        Some(PendingDelete {
            ids,
            includes_folder,
        })
    }

    /// Drop nodes locally ahead of the authoritative reload.
    pub fn remove<'i>(&mut self, ids: impl IntoIterator<Item = &'i str>) {
        for id in ids {
            self.tree.remove(id);
        }
    }

    pub fn mark_pending(&mut self, id: &str) -> bool {
        self.tree.set_parsing_status(id, ParsingStatus::Pending)
    }

    pub(crate) fn finish_batch(&mut self, succeeded: bool) {
        if succeeded {
            self.state.clear_selection();
            self.clear_selection_on_ack = false;
        } else {
            self.clear_selection_on_ack = true;
        }
    }

    /// Called when the user dismisses a failure notification.
    pub fn acknowledge_failure(&mut self) {
        if std::mem::take(&mut self.clear_selection_on_ack) {
            self.state.clear_selection();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::FakeApi;
    use crate::tree::fixtures;

    #[tokio::test]
    async fn reload_sorts_snapshot() {
        let api = FakeApi::new(fixtures::six_node_tree());
        let mut store = DocumentStore::new();

        store.reload(&api).await.unwrap();

        assert!(store.is_loaded());
        let roots: Vec<&str> = store
            .rows("")
            .map(|r| r.node.id.as_str())
            .collect();
        assert_eq!(roots, vec!["f2", "f1", "d4"]);
    }

    #[tokio::test]
    async fn failed_reload_keeps_previous_tree() {
        let api = FakeApi::new(fixtures::six_node_tree());
        let mut store = DocumentStore::new();
        store.reload(&api).await.unwrap();

        api.fail_tree_loads();
        let err = store.reload(&api).await.unwrap_err();

        assert!(matches!(err, StoreError::Api(_)));
        assert_eq!(store.tree().len(), 6);
    }

    #[tokio::test]
    async fn malformed_snapshot_is_rejected() {
        let dup = vec![
            TreeNode::file("x", "a.pdf", None),
            TreeNode::file("x", "b.pdf", None),
        ];
        let api = FakeApi::new(dup);
        let mut store = DocumentStore::new();

        let err = store.reload(&api).await.unwrap_err();

        assert!(matches!(err, StoreError::Tree(TreeError::DuplicateId(_))));
        assert!(!store.is_loaded());
    }

    #[tokio::test]
    async fn failed_first_load_still_counts_as_attempted() {
        let api = FakeApi::new(fixtures::six_node_tree());
        api.fail_tree_loads();
        let mut store = DocumentStore::new();
        assert!(!store.load_attempted());

        assert!(store.reload(&api).await.is_err());

        assert!(store.load_attempted());
        assert!(!store.is_loaded());
        assert!(store.tree().is_empty());
    }

    #[test]
    fn replace_discards_expansion_and_stale_selection() {
        let mut store = DocumentStore::new();
        store.replace(fixtures::six_node_tree()).unwrap();
        store.toggle_expansion("f1");
        store.toggle_selection("d1");
        store.toggle_selection("d4");

        let mut next = fixtures::six_node_tree();
        next.pop();
        store.replace(next).unwrap();

        assert!(!store.state().is_expanded("f1"));
        assert_eq!(store.selected_ids(), vec!["d1".to_string()]);
    }

    #[test]
    fn prepare_delete_needs_selection() {
        let mut store = DocumentStore::new();
        store.replace(fixtures::six_node_tree()).unwrap();
        assert!(store.prepare_delete().is_none());

        store.toggle_selection("d4");
        let pending = store.prepare_delete().unwrap();
        assert_eq!(pending.prompt(), "Delete 1 item?");

        store.toggle_selection("f1");
        let pending = store.prepare_delete().unwrap();
        assert_eq!(pending.len(), 2);
        assert!(pending.prompt().contains("Folders are removed"));
    }

    #[test]
    fn failed_batch_clears_selection_on_acknowledge() {
        let mut store = DocumentStore::new();
        store.replace(fixtures::six_node_tree()).unwrap();
        store.toggle_selection("d1");

        store.finish_batch(false);
        assert_eq!(store.state().selection_len(), 1);

        store.acknowledge_failure();
        assert_eq!(store.state().selection_len(), 0);
    }

    #[test]
    fn all_selected_tracks_tree_size() {
        let mut store = DocumentStore::new();
        assert!(!store.all_selected());
        store.replace(fixtures::six_node_tree()).unwrap();

        store.select_all(true);
        assert!(store.all_selected());
        store.toggle_selection("d1");
        assert!(!store.all_selected());
    }
}
