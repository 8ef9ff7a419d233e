use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::slideshow::Timeline;

#[derive(Debug, Clone)]
pub(crate) struct EncodedVideo {
    pub(crate) bytes: Vec<u8>,
    pub(crate) content_type: &'static str,
    pub(crate) extension: &'static str,
}

#[async_trait]
pub(crate) trait VideoEncoder: Send + Sync {
    async fn encode(&self, timeline: &Timeline) -> Result<EncodedVideo, DomainError>;
}
