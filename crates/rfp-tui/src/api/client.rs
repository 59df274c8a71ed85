use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client, StatusCode};
use rfp_shared::{
    api::{CreateFolderRequest, UpdateDocumentRequest},
    IngestResponse, TreeNode,
};

use super::DocumentApi;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Resource not found")]
    NotFound,
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Server error: {0}")]
    Server(String),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Could not read {path}: {source}")]
    File {
        path: String,
        source: std::io::Error,
    },
}

/// Map a non-success status and its body text to an error.
fn status_error(status: StatusCode, text: String) -> ApiError {
    match status {
        StatusCode::NOT_FOUND => ApiError::NotFound,
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ApiError::Validation(text),
        StatusCode::CONFLICT => ApiError::Conflict(text),
        _ => ApiError::Server(format!("{}: {}", status, text)),
    }
}

pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build URL for endpoint
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn document_url(&self, id: &str, suffix: &str) -> String {
        self.url(&format!("/documents/{}{}", urlencoding::encode(id), suffix))
    }

    /// Handle API response
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();

        match status {
            StatusCode::OK | StatusCode::CREATED => {
                response.json().await.map_err(ApiError::Network)
            }
            _ => {
                let text = response.text().await.unwrap_or_default();
                Err(status_error(status, text))
            }
        }
    }

    /// Handle empty response
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<(), ApiError> {
        let status = response.status();

        match status {
            StatusCode::OK | StatusCode::CREATED | StatusCode::ACCEPTED | StatusCode::NO_CONTENT => {
                Ok(())
            }
            _ => {
                let text = response.text().await.unwrap_or_default();
                Err(status_error(status, text))
            }
        }
    }
}

#[async_trait]
impl DocumentApi for ApiClient {
    async fn get_tree(&self) -> Result<Vec<TreeNode>, ApiError> {
        let response = self.client.get(self.url("/documents/tree")).send().await?;
        self.handle_response(response).await
    }

    async fn create_folder(&self, name: &str, parent_id: Option<&str>) -> Result<TreeNode, ApiError> {
        let req = CreateFolderRequest {
            name: name.to_string(),
            parent_id: parent_id.map(|p| p.to_string()),
        };
        let response = self
            .client
            .post(self.url("/documents/folders"))
            .json(&req)
            .send()
            .await?;
        self.handle_response(response).await
    }

    async fn delete_document(&self, id: &str) -> Result<(), ApiError> {
        let response = self.client.delete(self.document_url(id, "")).send().await?;
        self.handle_empty_response(response).await
    }

    async fn reindex_document(&self, id: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.document_url(id, "/reindex"))
            .send()
            .await?;
        self.handle_empty_response(response).await
    }

    async fn update_document(&self, id: &str, req: &UpdateDocumentRequest) -> Result<(), ApiError> {
        let response = self
            .client
            .patch(self.document_url(id, ""))
            .json(req)
            .send()
            .await?;
        self.handle_empty_response(response).await
    }

    async fn upload_file(&self, path: &Path, group_id: Option<&str>) -> Result<IngestResponse, ApiError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| ApiError::File {
            path: path.display().to_string(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let mut form = multipart::Form::new()
            .part("file", multipart::Part::bytes(bytes).file_name(file_name));
        if let Some(group_id) = group_id {
            form = form.text("group_id", group_id.to_string());
        }

        let response = self
            .client
            .post(self.url("/ingest/upload"))
            .multipart(form)
            .send()
            .await?;
        self.handle_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_slash_and_encodes_ids() {
        let api = ApiClient::new("http://localhost:8000/", Duration::from_secs(5)).unwrap();

        assert_eq!(api.base_url(), "http://localhost:8000");
        assert_eq!(
            api.document_url("a b/c", "/reindex"),
            "http://localhost:8000/documents/a%20b%2Fc/reindex"
        );
    }

    #[test]
    fn maps_statuses_to_errors() {
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, String::new()),
            ApiError::NotFound
        ));
        assert!(matches!(
            status_error(StatusCode::UNPROCESSABLE_ENTITY, "bad id".into()),
            ApiError::Validation(msg) if msg == "bad id"
        ));
        assert!(matches!(
            status_error(StatusCode::CONFLICT, "exists".into()),
            ApiError::Conflict(_)
        ));
        let err = status_error(StatusCode::INTERNAL_SERVER_ERROR, "boom".into());
        assert_eq!(err.to_string(), "Server error: 500 Internal Server Error: boom");
    }
}
