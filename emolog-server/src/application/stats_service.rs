use chrono::{DateTime, FixedOffset, Utc};
use uuid::Uuid;

use crate::data::post_repository::PostRepository;
use crate::domain::error::DomainError;
use crate::domain::streak::{StreakResult, compute_streak};

pub(crate) struct StatsService<R: PostRepository> {
    repo: R,
    offset: FixedOffset,
}

impl<R: PostRepository> StatsService<R> {
    pub(crate) fn new(repo: R, offset: FixedOffset) -> Self {
        Self { repo, offset }
    }

    pub(crate) async fn user_stats(&self, user_id: Uuid) -> Result<StreakResult, DomainError> {
        self.user_stats_at(user_id, Utc::now()).await
    }

    pub(crate) async fn user_stats_at(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<StreakResult, DomainError> {
        let timestamps = self.repo.list_post_timestamps(user_id).await?;
        Ok(compute_streak(&timestamps, now, self.offset))
    }
}
