use std::convert::Infallible;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Sentinel the move dialog uses for "no parent".
pub const ROOT_SENTINEL: &str = "root";

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateFolderRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

/// Body of `PATCH /documents/{id}`. `parent_id` is always sent; `null`
/// moves the node to the root.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct UpdateDocumentRequest {
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MoveTarget {
    Root,
    Folder(String),
}

impl MoveTarget {
    pub fn parent_id(&self) -> Option<&str> {
        match self {
            MoveTarget::Root => None,
            MoveTarget::Folder(id) => Some(id),
        }
    }
}

impl FromStr for MoveTarget {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(if s == ROOT_SENTINEL {
            MoveTarget::Root
        } else {
            MoveTarget::Folder(s.to_string())
        })
    }
}

impl From<&MoveTarget> for UpdateDocumentRequest {
    fn from(target: &MoveTarget) -> Self {
        Self {
            parent_id: target.parent_id().map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_sentinel_moves_to_null_parent() {
        let target: MoveTarget = "root".parse().unwrap();
        assert_eq!(target, MoveTarget::Root);

        let body = serde_json::to_value(UpdateDocumentRequest::from(&target)).unwrap();
        assert_eq!(body, serde_json::json!({ "parent_id": null }));
    }

    #[test]
    fn folder_target_keeps_id() {
        let target: MoveTarget = "f-42".parse().unwrap();
        let body = serde_json::to_value(UpdateDocumentRequest::from(&target)).unwrap();
        assert_eq!(body, serde_json::json!({ "parent_id": "f-42" }));
    }

    #[test]
    fn create_folder_omits_missing_parent() {
        let req = CreateFolderRequest {
            name: "Contracts".into(),
            parent_id: None,
        };
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body, serde_json::json!({ "name": "Contracts" }));
    }
}
