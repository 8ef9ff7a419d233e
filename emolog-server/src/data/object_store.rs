use async_trait::async_trait;

use crate::domain::error::DomainError;

#[async_trait]
pub(crate) trait ObjectStore: Send + Sync {
    async fn download(&self, bucket: &str, path: &str) -> Result<Vec<u8>, DomainError>;

    /// Stores `body` at `path`, replacing any existing object.
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), DomainError>;

    fn public_url(&self, bucket: &str, path: &str) -> String;
}
