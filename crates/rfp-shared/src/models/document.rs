use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Folder,
    File,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParsingStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl ParsingStatus {
    /// Short label shown in the status column. Pending and processing
    /// collapse into one "queued" state.
    pub fn label(self) -> &'static str {
        match self {
            ParsingStatus::Completed => "done",
            ParsingStatus::Failed => "failed",
            ParsingStatus::Pending | ParsingStatus::Processing => "queued",
        }
    }
}

/// A folder or file as returned by `GET /documents/tree`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parsing_status: Option<ParsingStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub expanded: bool,
}

impl TreeNode {
    pub fn folder(id: impl Into<String>, name: impl Into<String>, children: Vec<TreeNode>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: NodeKind::Folder,
            uploaded_at: None,
            parsing_status: None,
            file_size: None,
            children,
            expanded: false,
        }
    }

    pub fn file(id: impl Into<String>, name: impl Into<String>, uploaded_at: Option<&str>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: NodeKind::File,
            uploaded_at: uploaded_at.map(str::to_string),
            parsing_status: None,
            file_size: None,
            children: Vec::new(),
            expanded: false,
        }
    }

    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }
}
