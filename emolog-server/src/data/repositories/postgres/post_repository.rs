use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::data::post_repository::PostRepository;
use crate::domain::error::DomainError;
use crate::domain::local_time::UtcRange;
use crate::domain::post::{FrameSource, Post};

#[derive(Debug, Clone)]
pub(crate) struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct FrameSourceRow {
    id: i64,
    file_path: String,
}

#[derive(FromRow)]
struct PostRow {
    id: i64,
    user_id: Uuid,
    created_at: String,
    image_url: String,
    file_path: String,
    emotion: String,
    ai_comment: String,
    user_caption: Option<String>,
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn list_post_timestamps(&self, user_id: Uuid) -> Result<Vec<String>, DomainError> {
        // to_json renders timestamptz as ISO-8601 with an explicit offset.
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT COALESCE(to_json(created_at) #>> '{}', '') AS created_at_iso
            FROM posts
            WHERE user_id = $1
            ORDER BY posts.created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_post_db_error)
    }

    async fn list_frame_sources(
        &self,
        user_id: Uuid,
        range: UtcRange,
    ) -> Result<Vec<FrameSource>, DomainError> {
        let rows = sqlx::query_as::<_, FrameSourceRow>(
            r#"
            SELECT id, file_path
            FROM posts
            WHERE user_id = $1
              AND created_at >= $2
              AND created_at < $3
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(rows
            .into_iter()
            .map(|row| FrameSource {
                post_id: row.id,
                file_path: row.file_path,
            })
            .collect())
    }

    async fn list_posts(&self, user_id: Uuid) -> Result<Vec<Post>, DomainError> {
        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT
                id,
                user_id,
                COALESCE(to_json(created_at) #>> '{}', '') AS created_at,
                COALESCE(image_url, '') AS image_url,
                COALESCE(file_path, '') AS file_path,
                COALESCE(emotion, '') AS emotion,
                COALESCE(ai_comment, '') AS ai_comment,
                user_caption
            FROM posts
            WHERE user_id = $1
            ORDER BY posts.created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(rows.into_iter().map(map_row_to_post).collect())
    }
}

fn map_row_to_post(row: PostRow) -> Post {
    Post::new(
        row.id,
        row.user_id,
        row.created_at,
        row.image_url,
        row.file_path,
        row.emotion,
        row.ai_comment,
        row.user_caption,
    )
}

fn map_post_db_error(err: sqlx::Error) -> DomainError {
    DomainError::Unexpected(format!("posts query failed: {err}"))
}
