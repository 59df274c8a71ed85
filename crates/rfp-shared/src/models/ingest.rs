use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestStatus {
    Success,
    Conflict,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictKind {
    Duplicate,
    Version,
    Content,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictDetail {
    #[serde(rename = "type")]
    pub kind: ConflictKind,
    pub existing_doc_id: String,
    pub similarity: f64,
}

/// Result of `POST /ingest/upload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestResponse {
    pub filename: String,
    pub content_hash: String,
    pub status: IngestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conflict_detail: Option<ConflictDetail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<String>,
}

impl IngestResponse {
    /// One-line summary for the notification bar.
    pub fn summary(&self) -> String {
        match (self.status, &self.conflict_detail) {
            (IngestStatus::Success, _) => match &self.doc_id {
                Some(id) => format!("Uploaded {} as {}", self.filename, id),
                None => format!("Uploaded {}", self.filename),
            },
            (IngestStatus::Conflict, Some(detail)) => format!(
                "{} conflicts with {} ({:?}, {:.0}% similar)",
                self.filename,
                detail.existing_doc_id,
                detail.kind,
                detail.similarity * 100.0
            ),
            (IngestStatus::Conflict, None) => format!("{} conflicts with an existing document", self.filename),
            (IngestStatus::Error, _) => format!("Ingestion of {} failed", self.filename),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_conflict_response() {
        let json = r#"{
            "filename": "rfp.pdf",
            "content_hash": "abc123",
            "status": "conflict",
            "conflict_detail": {"type": "version", "existing_doc_id": "doc-9", "similarity": 0.87}
        }"#;

        let resp: IngestResponse = serde_json::from_str(json).unwrap();

        assert_eq!(resp.status, IngestStatus::Conflict);
        let detail = resp.conflict_detail.as_ref().unwrap();
        assert_eq!(detail.kind, ConflictKind::Version);
        assert_eq!(detail.existing_doc_id, "doc-9");
        assert_eq!(resp.summary(), "rfp.pdf conflicts with doc-9 (Version, 87% similar)");
    }

    #[test]
    fn success_summary_names_new_document() {
        let resp = IngestResponse {
            filename: "a.hwp".into(),
            content_hash: "h".into(),
            status: IngestStatus::Success,
            conflict_detail: None,
            doc_id: Some("doc-1".into()),
        };
        assert_eq!(resp.summary(), "Uploaded a.hwp as doc-1");
    }
}
