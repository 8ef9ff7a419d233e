use chrono::FixedOffset;
use uuid::Uuid;

use super::error::DomainError;
use super::local_time::{UtcRange, month_utc_range};

const MIN_YEAR: i32 = 1970;
const MAX_YEAR: i32 = 9999;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TimelapseRequest {
    pub(crate) user_id: Uuid,
    pub(crate) year: i32,
    pub(crate) month: u32,
}

impl TimelapseRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&self.year) {
            return Err(DomainError::Validation {
                field: "year",
                message: "must be 1970..9999",
            });
        }
        if !(1..=12).contains(&self.month) {
            return Err(DomainError::Validation {
                field: "month",
                message: "must be 1..12",
            });
        }
        Ok(self)
    }

    pub(crate) fn utc_range(&self, offset: FixedOffset) -> Result<UtcRange, DomainError> {
        month_utc_range(self.year, self.month, offset)
    }

    /// Storage path of the rendered video; one object per user and month.
    pub(crate) fn object_path(&self, extension: &str) -> String {
        format!(
            "{}/{:04}-{:02}.{extension}",
            self.user_id, self.year, self.month
        )
    }

    pub(crate) fn period_label(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TimelapseArtifact {
    pub(crate) object_path: String,
    pub(crate) url: String,
    pub(crate) slide_count: usize,
}
