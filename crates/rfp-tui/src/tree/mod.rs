//! Document tree model.
//!
//! The backend snapshot is sorted once on load and copied into an arena of
//! [`Node`]s indexed by [`NodeId`]. Expansion and selection live outside the
//! arena in [`ViewState`], keyed by the backend's string ids.

mod rows;
mod sort;
mod state;
mod store;

use std::collections::HashMap;

use rfp_shared::{NodeKind, ParsingStatus, TreeNode};

pub use rows::{Row, Rows};
pub use sort::sort_nodes;
pub use state::ViewState;
pub use store::{DocumentStore, PendingDelete};

pub type NodeId = usize;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("Duplicate node id: {0}")]
    DuplicateId(String),
    #[error("File {0} cannot contain children")]
    FileWithChildren(String),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub id: String,
    pub name: String,
    pub kind: NodeKind,
    pub uploaded_at: Option<String>,
    pub parsing_status: Option<ParsingStatus>,
    pub file_size: Option<String>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl Node {
    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }
}

#[derive(Debug, Clone, Default)]
pub struct Tree {
    nodes: Vec<Node>,
    index: HashMap<String, NodeId>,
    roots: Vec<NodeId>,
}

impl Tree {
    /// Build an arena from a snapshot, keeping sibling order as given.
    pub fn from_nodes(nodes: Vec<TreeNode>) -> Result<Self, TreeError> {
        let mut tree = Self::default();
        for node in nodes {
            let id = tree.insert(node, None)?;
            tree.roots.push(id);
        }
        Ok(tree)
    }

    fn insert(&mut self, node: TreeNode, parent: Option<NodeId>) -> Result<NodeId, TreeError> {
        if self.index.contains_key(&node.id) {
            return Err(TreeError::DuplicateId(node.id));
        }
        if node.kind == NodeKind::File && !node.children.is_empty() {
            return Err(TreeError::FileWithChildren(node.id));
        }

        let id = self.nodes.len();
        self.index.insert(node.id.clone(), id);
        self.nodes.push(Node {
            id: node.id,
            name: node.name,
            kind: node.kind,
            uploaded_at: node.uploaded_at,
            parsing_status: node.parsing_status,
            file_size: node.file_size,
            parent,
            children: Vec::with_capacity(node.children.len()),
        });

        for child in node.children {
            let child_id = self.insert(child, Some(id))?;
            self.nodes[id].children.push(child_id);
        }
        Ok(id)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&idx| &self.nodes[idx])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Number of nodes still attached to the tree.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Every attached node id, folders and files alike.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    pub fn is_folder(&self, id: &str) -> bool {
        self.get(id).is_some_and(Node::is_folder)
    }

    /// Detach `id` and its subtree. Returns false if the id is unknown.
    pub fn remove(&mut self, id: &str) -> bool {
        let Some(&idx) = self.index.get(id) else {
            return false;
        };

        match self.nodes[idx].parent {
            Some(parent) => self.nodes[parent].children.retain(|&c| c != idx),
            None => self.roots.retain(|&r| r != idx),
        }

        let mut stack = vec![idx];
        while let Some(cur) = stack.pop() {
            self.index.remove(&self.nodes[cur].id);
            stack.extend(self.nodes[cur].children.iter().copied());
        }
        true
    }

    pub fn set_parsing_status(&mut self, id: &str, status: ParsingStatus) -> bool {
        match self.index.get(id) {
            Some(&idx) if self.nodes[idx].kind == NodeKind::File => {
                self.nodes[idx].parsing_status = Some(status);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use rfp_shared::TreeNode;

    /// Two folders (one holding three files, one empty) and a root file.
    pub fn six_node_tree() -> Vec<TreeNode> {
        vec![
            TreeNode::folder(
                "f1",
                "Proposals",
                vec![
                    TreeNode::file("d1", "Q4_report.pdf", Some("2024-03-01")),
                    TreeNode::file("d2", "notes.txt", Some("2024-01-15")),
                    TreeNode::file("d3", "budget.xlsx", None),
                ],
            ),
            TreeNode::folder("f2", "Archive", vec![]),
            TreeNode::file("d4", "readme.md", Some("2023-12-31")),
        ]
    }
}
