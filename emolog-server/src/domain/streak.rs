use std::collections::HashSet;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use tracing::warn;

use super::local_time::{local_date, parse_timestamp};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct StreakResult {
    pub(crate) post_count: u64,
    pub(crate) streak_days: u32,
}

/// Computes the post count and the current daily streak.
///
/// `post_count` is the raw number of rows, so several posts on one local day
/// (or rows with malformed timestamps) all count. The streak walks backward
/// from today, or from yesterday when nothing has been posted yet today.
pub(crate) fn compute_streak<S: AsRef<str>>(
    timestamps: &[S],
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> StreakResult {
    if timestamps.is_empty() {
        return StreakResult::default();
    }

    let post_count = timestamps.len() as u64;
    let days = posted_days(timestamps, offset);

    StreakResult {
        post_count,
        streak_days: walk_streak(&days, local_date(now, offset)),
    }
}

fn posted_days<S: AsRef<str>>(timestamps: &[S], offset: FixedOffset) -> HashSet<NaiveDate> {
    timestamps
        .iter()
        .filter_map(|raw| match parse_timestamp(raw.as_ref()) {
            Ok(instant) => Some(local_date(instant, offset)),
            Err(err) => {
                warn!(error = %err, "skipping post with malformed created_at");
                None
            }
        })
        .collect()
}

fn walk_streak(days: &HashSet<NaiveDate>, today: NaiveDate) -> u32 {
    let start = if days.contains(&today) {
        Some(today)
    } else {
        today.pred_opt()
    };

    let mut streak = 0;
    let mut cursor = start;
    while let Some(day) = cursor.filter(|day| days.contains(day)) {
        streak += 1;
        cursor = day.pred_opt();
    }
    streak
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
    use proptest::prelude::*;

    use super::{StreakResult, compute_streak};
    use crate::domain::local_time::jst;

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        jst()
            .with_ymd_and_hms(y, m, d, h, min, s)
            .single()
            .expect("valid local time")
            .with_timezone(&Utc)
    }

    fn rfc3339(instants: &[DateTime<Utc>]) -> Vec<String> {
        instants.iter().map(|i| i.to_rfc3339()).collect()
    }

    fn three_day_run() -> Vec<String> {
        rfc3339(&[
            local(2024, 1, 1, 8, 0, 0),
            local(2024, 1, 2, 12, 30, 0),
            local(2024, 1, 3, 21, 15, 0),
        ])
    }

    #[test]
    fn empty_input_yields_zero_counts() {
        let result = compute_streak::<String>(&[], local(2024, 1, 3, 23, 0, 0), jst());
        assert_eq!(
            result,
            StreakResult {
                post_count: 0,
                streak_days: 0
            }
        );
    }

    #[test]
    fn three_consecutive_days_ending_today() {
        let result = compute_streak(&three_day_run(), local(2024, 1, 3, 23, 0, 0), jst());
        assert_eq!(result.post_count, 3);
        assert_eq!(result.streak_days, 3);
    }

    #[test]
    fn streak_survives_until_end_of_next_day() {
        let result = compute_streak(&three_day_run(), local(2024, 1, 4, 23, 59, 59), jst());
        assert_eq!(result.streak_days, 3);
    }

    #[test]
    fn full_day_gap_resets_streak() {
        let result = compute_streak(&three_day_run(), local(2024, 1, 5, 0, 0, 0), jst());
        assert_eq!(result.post_count, 3);
        assert_eq!(result.streak_days, 0);
    }

    #[test]
    fn post_one_second_before_local_midnight_counts_for_previous_day() {
        let posts = rfc3339(&[local(2024, 1, 1, 23, 59, 59)]);

        let on_jan_first = compute_streak(&posts, local(2024, 1, 1, 23, 59, 59), jst());
        let on_jan_third = compute_streak(&posts, local(2024, 1, 3, 0, 0, 0), jst());

        assert_eq!(on_jan_first.streak_days, 1);
        assert_eq!(on_jan_third.streak_days, 0);
    }

    #[test]
    fn utc_midnight_does_not_split_local_day() {
        // 14:00Z and 16:00Z on Jan 1 are local Jan 1 and Jan 2.
        let posts = vec![
            "2024-01-01T14:00:00Z".to_string(),
            "2024-01-01T16:00:00Z".to_string(),
        ];
        let result = compute_streak(&posts, local(2024, 1, 2, 12, 0, 0), jst());
        assert_eq!(result.streak_days, 2);
    }

    #[test]
    fn duplicates_inflate_count_but_not_streak() {
        let posts = rfc3339(&[
            local(2024, 1, 3, 8, 0, 0),
            local(2024, 1, 3, 12, 0, 0),
            local(2024, 1, 3, 20, 0, 0),
        ]);
        let result = compute_streak(&posts, local(2024, 1, 3, 23, 0, 0), jst());
        assert_eq!(result.post_count, 3);
        assert_eq!(result.streak_days, 1);
    }

    #[test]
    fn malformed_timestamps_are_skipped_not_fatal() {
        let mut posts = three_day_run();
        posts.push("not a timestamp".to_string());
        posts.push(String::new());

        let result = compute_streak(&posts, local(2024, 1, 3, 23, 0, 0), jst());
        assert_eq!(result.post_count, 5);
        assert_eq!(result.streak_days, 3);
    }

    #[test]
    fn computing_twice_is_idempotent() {
        let posts = three_day_run();
        let now = local(2024, 1, 3, 23, 0, 0);
        assert_eq!(
            compute_streak(&posts, now, jst()),
            compute_streak(&posts, now, jst())
        );
    }

    fn trailing_days(now: DateTime<Utc>, count: u32, skip_today: bool) -> Vec<String> {
        let first = if skip_today { 1 } else { 0 };
        (first..first + count)
            .map(|back| (now - Duration::days(i64::from(back))).to_rfc3339())
            .collect()
    }

    proptest! {
        #[test]
        fn streak_grows_with_each_trailing_day(
            secs in 0i64..(365 * 24 * 3600),
            count in 0u32..60,
            skip_today in any::<bool>(),
        ) {
            let now = local(2023, 1, 1, 0, 0, 0) + Duration::seconds(secs);
            let shorter = compute_streak(&trailing_days(now, count, skip_today), now, jst());
            let longer = compute_streak(&trailing_days(now, count + 1, skip_today), now, jst());

            prop_assert_eq!(shorter.streak_days, count);
            prop_assert_eq!(longer.streak_days, count + 1);
        }

        #[test]
        fn streak_is_zero_when_today_and_yesterday_are_missing(
            secs in 0i64..(365 * 24 * 3600),
            offsets in prop::collection::vec(2i64..400, 0..30),
        ) {
            let now = local(2023, 1, 1, 0, 0, 0) + Duration::seconds(secs);
            let today = crate::domain::local_time::local_date(now, jst());
            let posts: Vec<String> = offsets
                .iter()
                .map(|back| {
                    let day = today - Duration::days(*back);
                    local(day.year(), day.month(), day.day(), 12, 0, 0).to_rfc3339()
                })
                .collect();

            let result = compute_streak(&posts, now, jst());
            prop_assert_eq!(result.post_count, posts.len() as u64);
            prop_assert_eq!(result.streak_days, 0);
        }
    }
}
