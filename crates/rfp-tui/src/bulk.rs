//! Fan-out/fan-in operations over the current selection.
//!
//! Each action issues its per-id calls together, waits for all of them to
//! settle, then reloads the tree exactly once. Partial failures are not
//! rolled back; the reload shows whatever the server ended up with.
//! Uploads are the exception and go out one at a time.

use std::path::Path;

use futures::future::join_all;
use rfp_shared::{
    api::{MoveTarget, UpdateDocumentRequest},
    IngestStatus, NodeKind,
};

use crate::api::{ApiError, DocumentApi};
use crate::tree::{DocumentStore, PendingDelete};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    Delete,
    Move,
    Reindex,
}

impl BulkAction {
    fn verb(self) -> &'static str {
        match self {
            BulkAction::Delete => "Delete",
            BulkAction::Move => "Move",
            BulkAction::Reindex => "Re-parse",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkOutcome {
    pub action: BulkAction,
    pub attempted: usize,
    pub failed: usize,
    pub reloaded: bool,
}

impl BulkOutcome {
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// The single message shown for the whole batch.
    pub fn notification(&self) -> String {
        let base = if self.attempted == 0 {
            "Nothing selected".to_string()
        } else if self.is_success() {
            match self.action {
                BulkAction::Delete => format!("Deleted {} item(s)", self.attempted),
                BulkAction::Move => format!("Moved {} item(s)", self.attempted),
                BulkAction::Reindex => "Re-parse started".to_string(),
            }
        } else {
            format!("{} failed", self.action.verb())
        };
        if self.attempted > 0 && !self.reloaded {
            format!("{}; refreshing the document list failed", base)
        } else {
            base
        }
    }
}

/// A destination offered by the move dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOption {
    pub target: MoveTarget,
    pub label: String,
    pub depth: usize,
}

/// Root followed by every folder, depth-first, skipping the selection and
/// everything under it.
pub fn move_targets(store: &DocumentStore) -> Vec<MoveOption> {
    let tree = store.tree();
    let selected = store.state().selection();
    let mut options = vec![MoveOption {
        target: MoveTarget::Root,
        label: "/ (root)".to_string(),
        depth: 0,
    }];

    let mut stack: Vec<(usize, usize)> = tree.roots().iter().rev().map(|&id| (id, 0)).collect();
    while let Some((id, depth)) = stack.pop() {
        let node = tree.node(id);
        if node.kind != NodeKind::Folder || selected.contains(&node.id) {
            continue;
        }
        options.push(MoveOption {
            target: MoveTarget::Folder(node.id.clone()),
            label: node.name.clone(),
            depth: depth + 1,
        });
        stack.extend(node.children.iter().rev().map(|&c| (c, depth + 1)));
    }
    options
}

pub async fn delete<A: DocumentApi + ?Sized>(
    api: &A,
    store: &mut DocumentStore,
    pending: PendingDelete,
) -> BulkOutcome {
    let ids = pending.ids;
    tracing::info!(count = ids.len(), "Deleting documents");

    let results = join_all(ids.iter().map(|id| api.delete_document(id))).await;
    let succeeded = settle(BulkAction::Delete, &ids, &results);
    store.remove(succeeded.iter().copied());

    finish(api, store, BulkAction::Delete, ids.len(), succeeded.len(), true).await
}

pub async fn move_selected<A: DocumentApi + ?Sized>(
    api: &A,
    store: &mut DocumentStore,
    target: &MoveTarget,
) -> BulkOutcome {
    let ids = store.selected_ids();
    if ids.is_empty() {
        return BulkOutcome {
            action: BulkAction::Move,
            attempted: 0,
            failed: 0,
            reloaded: false,
        };
    }
    tracing::info!(count = ids.len(), parent = ?target.parent_id(), "Moving documents");

    let req = UpdateDocumentRequest::from(target);
    let results = join_all(ids.iter().map(|id| api.update_document(id, &req))).await;
    let succeeded = settle(BulkAction::Move, &ids, &results);
    store.remove(succeeded.iter().copied());

    finish(api, store, BulkAction::Move, ids.len(), succeeded.len(), true).await
}

/// Re-parse one file. The tree is reloaded whatever the server answers.
pub async fn reindex<A: DocumentApi + ?Sized>(
    api: &A,
    store: &mut DocumentStore,
    id: &str,
) -> BulkOutcome {
    let ok = match api.reindex_document(id).await {
        Ok(()) => {
            store.mark_pending(id);
            true
        }
        Err(e) => {
            tracing::warn!(id, "Re-parse request failed: {}", e);
            false
        }
    };

    finish(api, store, BulkAction::Reindex, 1, usize::from(ok), false).await
}

/// What a run of uploads produced, reported as one notification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadOutcome {
    pub uploaded: usize,
    /// One line per upload the server flagged or refused.
    pub problems: Vec<String>,
    pub reloaded: bool,
}

impl UploadOutcome {
    pub fn is_success(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn notification(&self) -> String {
        let mut parts = Vec::with_capacity(self.problems.len() + 2);
        if self.uploaded > 0 || self.problems.is_empty() {
            parts.push(format!("Uploaded {} file(s)", self.uploaded));
        }
        parts.extend(self.problems.iter().cloned());
        if !self.reloaded {
            parts.push("refreshing the document list failed".to_string());
        }
        parts.join("; ")
    }
}

/// Upload files one after another, then reload once.
pub async fn upload<A: DocumentApi + ?Sized, P: AsRef<Path>>(
    api: &A,
    store: &mut DocumentStore,
    paths: &[P],
) -> UploadOutcome {
    let mut outcome = UploadOutcome::default();
    for path in paths {
        let path: &Path = path.as_ref();
        match api.upload_file(path, None).await {
            Ok(resp) => {
                tracing::info!(file = %resp.filename, status = ?resp.status, "Upload finished");
                match resp.status {
                    IngestStatus::Success => outcome.uploaded += 1,
                    IngestStatus::Conflict | IngestStatus::Error => outcome.problems.push(resp.summary()),
                }
            }
            Err(e) => {
                tracing::error!("Upload of {} failed: {}", path.display(), e);
                outcome
                    .problems
                    .push(format!("Upload failed for {}: {}", path.display(), e));
            }
        }
    }
    outcome.reloaded = store.reload(api).await.is_ok();
    outcome
}

fn settle<'a>(action: BulkAction, ids: &'a [String], results: &[Result<(), ApiError>]) -> Vec<&'a str> {
    let mut succeeded = Vec::with_capacity(ids.len());
    for (id, result) in ids.iter().zip(results) {
        match result {
            Ok(()) => succeeded.push(id.as_str()),
            Err(e) => tracing::warn!(id = %id, action = ?action, "Batch call failed: {}", e),
        }
    }
    succeeded
}

async fn finish<A: DocumentApi + ?Sized>(
    api: &A,
    store: &mut DocumentStore,
    action: BulkAction,
    attempted: usize,
    succeeded: usize,
    touches_selection: bool,
) -> BulkOutcome {
    let failed = attempted - succeeded;
    if touches_selection {
        store.finish_batch(failed == 0);
    }
    let reloaded = store.reload(api).await.is_ok();
    BulkOutcome {
        action,
        attempted,
        failed,
        reloaded,
    }
}
