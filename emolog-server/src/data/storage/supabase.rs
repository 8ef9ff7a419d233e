use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, header};
use serde::Deserialize;
use thiserror::Error;

use crate::data::object_store::ObjectStore;
use crate::domain::error::DomainError;

#[derive(Debug, Error)]
pub(crate) enum StorageError {
    #[error("storage transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("storage returned {status} for '{path}': {message}")]
    Status {
        status: StatusCode,
        path: String,
        message: String,
    },
}

impl From<StorageError> for DomainError {
    fn from(err: StorageError) -> Self {
        DomainError::Unexpected(err.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct ErrorResponseDto {
    message: Option<String>,
    error: Option<String>,
}

/// Client for the Supabase Storage REST API, authenticated with the
/// project's service key.
#[derive(Debug, Clone)]
pub(crate) struct SupabaseStorage {
    client: Client,
    base_url: String,
    service_key: String,
}

impl SupabaseStorage {
    pub(crate) fn new(
        base_url: &str,
        service_key: &str,
        timeout: Duration,
    ) -> Result<Self, StorageError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key: service_key.to_string(),
        })
    }

    fn object_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/{bucket}/{}",
            self.base_url,
            path.trim_start_matches('/')
        )
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
    }

    async fn decode_error(path: &str, response: Response) -> StorageError {
        let status = response.status();
        let message = match response.json::<ErrorResponseDto>().await {
            Ok(body) => body
                .message
                .or(body.error)
                .unwrap_or_else(|| format!("http status {status}")),
            Err(_) => format!("http status {status}"),
        };
        StorageError::Status {
            status,
            path: path.to_string(),
            message,
        }
    }
}

#[async_trait]
impl ObjectStore for SupabaseStorage {
    async fn download(&self, bucket: &str, path: &str) -> Result<Vec<u8>, DomainError> {
        let response = self
            .request(Method::GET, self.object_url(bucket, path))
            .send()
            .await
            .map_err(StorageError::from)?;
        if !response.status().is_success() {
            return Err(Self::decode_error(path, response).await.into());
        }

        let bytes = response.bytes().await.map_err(StorageError::from)?;
        Ok(bytes.to_vec())
    }

    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), DomainError> {
        let response = self
            .request(Method::POST, self.object_url(bucket, path))
            .header(header::CONTENT_TYPE, content_type)
            .header("x-upsert", "true")
            .body(body)
            .send()
            .await
            .map_err(StorageError::from)?;
        if !response.status().is_success() {
            return Err(Self::decode_error(path, response).await.into());
        }

        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{bucket}/{}",
            self.base_url,
            path.trim_start_matches('/')
        )
    }
}
