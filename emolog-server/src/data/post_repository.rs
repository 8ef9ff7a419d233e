use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::local_time::UtcRange;
use crate::domain::post::{FrameSource, Post};

#[async_trait]
pub(crate) trait PostRepository: Send + Sync {
    /// Creation timestamps of every post by `user_id`, newest first, as
    /// ISO-8601 text.
    async fn list_post_timestamps(&self, user_id: Uuid) -> Result<Vec<String>, DomainError>;

    /// Image locators of posts created inside `range`, oldest first.
    async fn list_frame_sources(
        &self,
        user_id: Uuid,
        range: UtcRange,
    ) -> Result<Vec<FrameSource>, DomainError>;

    async fn list_posts(&self, user_id: Uuid) -> Result<Vec<Post>, DomainError>;
}
