use chrono::{FixedOffset, NaiveDate};
use tracing::warn;
use uuid::Uuid;

use crate::data::post_repository::PostRepository;
use crate::domain::error::DomainError;
use crate::domain::post::Post;

#[derive(Debug, Clone)]
pub(crate) struct DiaryEntry {
    pub(crate) post: Post,
    /// Local calendar day of the post; `None` when the stored timestamp
    /// could not be parsed.
    pub(crate) date: Option<NaiveDate>,
}

pub(crate) struct DiaryService<R: PostRepository> {
    repo: R,
    offset: FixedOffset,
}

impl<R: PostRepository> DiaryService<R> {
    pub(crate) fn new(repo: R, offset: FixedOffset) -> Self {
        Self { repo, offset }
    }

    pub(crate) async fn list_diary(&self, user_id: Uuid) -> Result<Vec<DiaryEntry>, DomainError> {
        let posts = self.repo.list_posts(user_id).await?;

        Ok(posts
            .into_iter()
            .map(|post| {
                let date = match post.local_date(self.offset) {
                    Ok(date) => Some(date),
                    Err(err) => {
                        warn!(
                            post_id = post.id,
                            user_id = %post.user_id,
                            file_path = %post.file_path,
                            error = %err,
                            "diary entry without a date"
                        );
                        None
                    }
                };
                DiaryEntry { post, date }
            })
            .collect())
    }
}
