use chrono::{DateTime, Utc};

/// Daily-streak continuity rule.
///
/// Policy: whole UTC calendar days, not a rolling 24-hour window. Completing
/// at 23:00 and again at 01:00 the next day keeps the streak alive (the two
/// calendar dates are adjacent), while skipping a full calendar day breaks
/// it. Calendar comparison was chosen over elapsed-time division because
/// floor-based day math behaves badly around DST and timezone edges.
///
/// Returns the new streak value:
/// - no prior completion: 1
/// - prior completion earlier today: unchanged (a second completion on the
///   same day never double-counts)
/// - prior completion yesterday: `previous + 1`
/// - anything older: reset to 1
pub fn next_streak(previous: u32, last_completed: Option<DateTime<Utc>>, now: DateTime<Utc>) -> u32 {
    let Some(last) = last_completed else {
        return 1;
    };

    match (now.date_naive() - last.date_naive()).num_days() {
        0 => previous.max(1),
        1 => previous.saturating_add(1),
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn first_ever_completion_starts_at_one() {
        assert_eq!(next_streak(0, None, at(2026, 3, 10, 12)), 1);
    }

    #[test]
    fn consecutive_calendar_days_increment() {
        let last = at(2026, 3, 10, 9);
        assert_eq!(next_streak(3, Some(last), at(2026, 3, 11, 21)), 4);
    }

    #[test]
    fn late_night_to_early_morning_counts_as_consecutive() {
        // 23:00 on the 10th, 01:00 on the 11th: two hours apart but on
        // adjacent calendar days, so the streak continues.
        let last = at(2026, 3, 10, 23);
        assert_eq!(next_streak(5, Some(last), at(2026, 3, 11, 1)), 6);
    }

    #[test]
    fn same_day_completion_does_not_double_count() {
        let last = at(2026, 3, 10, 8);
        assert_eq!(next_streak(2, Some(last), at(2026, 3, 10, 20)), 2);
    }

    #[test]
    fn same_day_with_no_recorded_streak_still_yields_one() {
        let last = at(2026, 3, 10, 8);
        assert_eq!(next_streak(0, Some(last), at(2026, 3, 10, 20)), 1);
    }

    #[test]
    fn skipping_one_full_day_resets_to_one() {
        // Last completed the 10th, next on the 12th: the 11th was skipped.
        let last = at(2026, 3, 10, 12);
        assert_eq!(next_streak(7, Some(last), at(2026, 3, 12, 0)), 1);
    }

    #[test]
    fn longer_gaps_also_reset() {
        let last = at(2026, 3, 1, 12);
        assert_eq!(next_streak(30, Some(last), at(2026, 4, 1, 12)), 1);
    }

    #[test]
    fn almost_48_hours_apart_but_adjacent_dates_still_counts() {
        // 00:30 on the 10th to 23:30 on the 11th is ~47h elapsed, yet no
        // calendar day was skipped. A rolling-24h rule would reset here.
        let last = Utc.with_ymd_and_hms(2026, 3, 10, 0, 30, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 3, 11, 23, 30, 0).unwrap();
        assert_eq!(next_streak(1, Some(last), now), 2);
    }
}
