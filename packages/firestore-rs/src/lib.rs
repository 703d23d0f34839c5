// Minimal client for the Cloud Firestore REST API (documents resource).
// https://firebase.google.com/docs/firestore/reference/rest

use std::collections::BTreeMap;

pub mod models;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use thiserror::Error;

pub use crate::models::{Document, Value};
use crate::models::{
    CommitRequest, DocumentMask, ErrorBody, FieldTransform, ListDocumentsResponse, Precondition,
    ServerValue, Write, WriteDocument,
};

#[derive(Debug, Clone)]
pub struct FirestoreOptions {
    pub project_id: String,
    /// Web API key, sent as the `key` query parameter.
    pub api_key: Option<String>,
    /// OAuth bearer token minted by the caller. The client performs no
    /// token acquisition of its own.
    pub auth_token: Option<String>,
}

#[derive(Debug, Error)]
pub enum FirestoreError {
    #[error("request to Firestore failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Firestore returned {code} {status}: {message}")]
    Status {
        code: u16,
        status: String,
        message: String,
    },

    #[error("document not found: {0}")]
    NotFound(String),

    #[error("failed to decode Firestore response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone)]
pub struct FirestoreClient {
    options: FirestoreOptions,
    http: Client,
}

impl FirestoreClient {
    pub fn new(options: FirestoreOptions) -> Self {
        Self {
            options,
            http: Client::new(),
        }
    }

    fn documents_root(&self) -> String {
        format!(
            "https://firestore.googleapis.com/v1/projects/{}/databases/(default)/documents",
            self.options.project_id
        )
    }

    /// Full resource name for a document.
    pub fn document_name(&self, collection: &str, id: &str) -> String {
        format!(
            "projects/{}/databases/(default)/documents/{}/{}",
            self.options.project_id, collection, id
        )
    }

    fn apply_auth(&self, req: RequestBuilder) -> RequestBuilder {
        let req = match &self.options.api_key {
            Some(key) => req.query(&[("key", key.as_str())]),
            None => req,
        };
        match &self.options.auth_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Fetch a single document. A missing document is `Ok(None)`.
    pub async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, FirestoreError> {
        let url = format!("{}/{}/{}", self.documents_root(), collection, id);
        let res = self.apply_auth(self.http.get(&url)).send().await?;

        if res.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let res = check_status(res).await?;
        let doc = res
            .json::<Document>()
            .await
            .map_err(|e| FirestoreError::Decode(e.to_string()))?;
        Ok(Some(doc))
    }

    /// List every document in a collection, following `nextPageToken`.
    pub async fn list_documents(&self, collection: &str) -> Result<Vec<Document>, FirestoreError> {
        let url = format!("{}/{}", self.documents_root(), collection);
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut req = self.apply_auth(self.http.get(&url));
            if let Some(token) = &page_token {
                req = req.query(&[("pageToken", token.as_str())]);
            }

            let res = check_status(req.send().await?).await?;
            let page: ListDocumentsResponse = res
                .json()
                .await
                .map_err(|e| FirestoreError::Decode(e.to_string()))?;

            documents.extend(page.documents);
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(documents)
    }

    /// Create or fully overwrite a document. Field paths in
    /// `server_time_fields` are stamped by the backend at commit time.
    pub async fn set_document(
        &self,
        collection: &str,
        id: &str,
        fields: BTreeMap<String, Value>,
        server_time_fields: &[&str],
    ) -> Result<(), FirestoreError> {
        let write = Write {
            update: WriteDocument {
                name: self.document_name(collection, id),
                fields,
            },
            update_mask: None,
            update_transforms: server_time_transforms(server_time_fields),
            current_document: None,
        };
        self.commit(vec![write]).await
    }

    /// Partially update an existing document. The update mask is derived
    /// from the supplied fields. Fails with `NotFound` when the document
    /// does not exist.
    pub async fn update_document(
        &self,
        collection: &str,
        id: &str,
        fields: BTreeMap<String, Value>,
        server_time_fields: &[&str],
    ) -> Result<(), FirestoreError> {
        let field_paths = fields.keys().cloned().collect();
        let write = Write {
            update: WriteDocument {
                name: self.document_name(collection, id),
                fields,
            },
            update_mask: Some(DocumentMask { field_paths }),
            update_transforms: server_time_transforms(server_time_fields),
            current_document: Some(Precondition { exists: true }),
        };

        self.commit(vec![write]).await.map_err(|e| match e {
            FirestoreError::Status { code, status, .. }
                if code == 404 || status == "NOT_FOUND" || status == "FAILED_PRECONDITION" =>
            {
                FirestoreError::NotFound(format!("{}/{}", collection, id))
            }
            other => other,
        })
    }

    /// Apply a batch of writes atomically via `documents:commit`.
    pub async fn commit(&self, writes: Vec<Write>) -> Result<(), FirestoreError> {
        let url = format!("{}:commit", self.documents_root());
        let res = self
            .apply_auth(self.http.post(&url))
            .json(&CommitRequest { writes })
            .send()
            .await?;
        check_status(res).await?;
        Ok(())
    }
}

fn server_time_transforms(field_paths: &[&str]) -> Vec<FieldTransform> {
    field_paths
        .iter()
        .map(|path| FieldTransform {
            field_path: (*path).to_string(),
            set_to_server_value: ServerValue::RequestTime,
        })
        .collect()
}

async fn check_status(res: Response) -> Result<Response, FirestoreError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    let code = status.as_u16();
    let text = res.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => Err(FirestoreError::Status {
            code,
            status: body.error.status.unwrap_or_default(),
            message: body.error.message,
        }),
        Err(_) => Err(FirestoreError::Status {
            code,
            status: String::new(),
            message: text,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> FirestoreClient {
        FirestoreClient::new(FirestoreOptions {
            project_id: "demo-project".to_string(),
            api_key: None,
            auth_token: None,
        })
    }

    #[test]
    fn test_document_name() {
        assert_eq!(
            client().document_name("members", "uid1"),
            "projects/demo-project/databases/(default)/documents/members/uid1"
        );
    }

    #[test]
    fn test_server_time_transforms() {
        let transforms = server_time_transforms(&["createdAt", "lastLogin"]);
        assert_eq!(transforms.len(), 2);
        assert_eq!(transforms[0].field_path, "createdAt");
    }
}
