//! In-memory [`DocumentApi`] for tests.

use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use rfp_shared::{
    api::UpdateDocumentRequest, ConflictDetail, ConflictKind, IngestResponse, IngestStatus, TreeNode,
};

use super::{ApiError, DocumentApi};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateFolder(String, Option<String>),
    Delete(String),
    Reindex(String),
    Update(String, Option<String>),
    Upload(String),
}

pub struct FakeApi {
    tree: Mutex<Vec<TreeNode>>,
    failing: Mutex<HashSet<String>>,
    conflicting: Mutex<HashSet<String>>,
    fail_tree: AtomicBool,
    calls: Mutex<Vec<Call>>,
    tree_loads: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl FakeApi {
    pub fn new(tree: Vec<TreeNode>) -> Self {
        Self {
            tree: Mutex::new(tree),
            failing: Mutex::new(HashSet::new()),
            conflicting: Mutex::new(HashSet::new()),
            fail_tree: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
            tree_loads: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    /// Make every per-id call for `id` fail with a server error.
    pub fn fail_on(&self, id: &str) {
        self.failing.lock().unwrap().insert(id.to_string());
    }

    /// Answer uploads of `filename` with a version conflict against `doc-9`.
    pub fn conflict_on(&self, filename: &str) {
        self.conflicting.lock().unwrap().insert(filename.to_string());
    }

    pub fn fail_tree_loads(&self) {
        self.fail_tree.store(true, Ordering::SeqCst);
    }

    pub fn set_tree(&self, tree: Vec<TreeNode>) {
        *self.tree.lock().unwrap() = tree;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn tree_loads(&self) -> usize {
        self.tree_loads.load(Ordering::SeqCst)
    }

    /// Most delete/update calls that were awaiting a reply at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Stand in for a network round trip, tracking overlap with other calls.
    async fn round_trip(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    fn record(&self, call: Call, id: &str) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(call);
        if self.failing.lock().unwrap().contains(id) {
            Err(ApiError::Server(format!("500: {} failed", id)))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DocumentApi for FakeApi {
    async fn get_tree(&self) -> Result<Vec<TreeNode>, ApiError> {
        self.tree_loads.fetch_add(1, Ordering::SeqCst);
        if self.fail_tree.load(Ordering::SeqCst) {
            return Err(ApiError::Server("503: unavailable".into()));
        }
        Ok(self.tree.lock().unwrap().clone())
    }

    async fn create_folder(&self, name: &str, parent_id: Option<&str>) -> Result<TreeNode, ApiError> {
        self.record(
            Call::CreateFolder(name.to_string(), parent_id.map(str::to_string)),
            name,
        )?;
        Ok(TreeNode::folder(format!("new-{}", name), name, vec![]))
    }

    async fn delete_document(&self, id: &str) -> Result<(), ApiError> {
        self.round_trip().await;
        self.record(Call::Delete(id.to_string()), id)
    }

    async fn reindex_document(&self, id: &str) -> Result<(), ApiError> {
        self.record(Call::Reindex(id.to_string()), id)
    }

    async fn update_document(&self, id: &str, req: &UpdateDocumentRequest) -> Result<(), ApiError> {
        self.round_trip().await;
        self.record(Call::Update(id.to_string(), req.parent_id.clone()), id)
    }

    async fn upload_file(&self, path: &Path, _group_id: Option<&str>) -> Result<IngestResponse, ApiError> {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.record(Call::Upload(filename.clone()), &filename)?;
        if self.conflicting.lock().unwrap().contains(&filename) {
            return Ok(IngestResponse {
                filename,
                content_hash: "hash".into(),
                status: IngestStatus::Conflict,
                conflict_detail: Some(ConflictDetail {
                    kind: ConflictKind::Version,
                    existing_doc_id: "doc-9".into(),
                    similarity: 0.87,
                }),
                doc_id: None,
            });
        }
        Ok(IngestResponse {
            filename,
            content_hash: "hash".into(),
            status: IngestStatus::Success,
            conflict_detail: None,
            doc_id: Some("doc-new".into()),
        })
    }
}
