use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use uuid::Uuid;

use super::local_time::{TimestampError, local_date, parse_timestamp};

/// A diary post as stored by the upload flow. Read-only here.
#[derive(Debug, Clone)]
pub(crate) struct Post {
    pub(crate) id: i64,
    pub(crate) user_id: Uuid,
    /// ISO-8601 creation instant exactly as the datastore rendered it.
    pub(crate) created_at: String,
    pub(crate) image_url: String,
    pub(crate) file_path: String,
    pub(crate) emotion: String,
    pub(crate) ai_comment: String,
    pub(crate) user_caption: Option<String>,
}

/// The part of a post needed to render it into a timelapse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FrameSource {
    pub(crate) post_id: i64,
    pub(crate) file_path: String,
}

impl Post {
    /// Builds a post from a stored row. Rows are listed as they are, so no
    /// field is rejected here; only surrounding whitespace is trimmed.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: i64,
        user_id: Uuid,
        created_at: impl Into<String>,
        image_url: impl Into<String>,
        file_path: impl Into<String>,
        emotion: impl Into<String>,
        ai_comment: impl Into<String>,
        user_caption: Option<String>,
    ) -> Self {
        Self {
            id,
            user_id,
            created_at: created_at.into(),
            image_url: image_url.into().trim().to_string(),
            file_path: file_path.into().trim().to_string(),
            emotion: emotion.into().trim().to_string(),
            ai_comment: ai_comment.into().trim().to_string(),
            user_caption: normalize_caption(user_caption),
        }
    }

    pub(crate) fn created_at_utc(&self) -> Result<DateTime<Utc>, TimestampError> {
        parse_timestamp(&self.created_at)
    }

    pub(crate) fn local_date(&self, offset: FixedOffset) -> Result<NaiveDate, TimestampError> {
        self.created_at_utc()
            .map(|instant| local_date(instant, offset))
    }
}

fn normalize_caption(caption: Option<String>) -> Option<String> {
    caption
        .map(|caption| caption.trim().to_string())
        .filter(|caption| !caption.is_empty())
}
