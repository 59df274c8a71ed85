use std::path::Path;

use async_trait::async_trait;
use rfp_shared::{api::UpdateDocumentRequest, IngestResponse, TreeNode};

use super::ApiError;

/// The document-listing and ingest calls the tree model depends on.
///
/// Methods take `&self` so a batch of calls can be in flight at once.
#[async_trait]
pub trait DocumentApi: Send + Sync {
    /// Full, unsorted snapshot of the corpus hierarchy.
    async fn get_tree(&self) -> Result<Vec<TreeNode>, ApiError>;

    async fn create_folder(&self, name: &str, parent_id: Option<&str>) -> Result<TreeNode, ApiError>;

    async fn delete_document(&self, id: &str) -> Result<(), ApiError>;

    /// Queue a re-parse. The parsing status changes later, on the server.
    async fn reindex_document(&self, id: &str) -> Result<(), ApiError>;

    async fn update_document(&self, id: &str, req: &UpdateDocumentRequest) -> Result<(), ApiError>;

    async fn upload_file(&self, path: &Path, group_id: Option<&str>) -> Result<IngestResponse, ApiError>;
}
