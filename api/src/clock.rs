//! Game clock arithmetic for college basketball.
//!
//! ESPN reports the clock as time *remaining* in the current period ("12:30").
//! Everything downstream wants time *elapsed* since tip-off, so this module
//! folds the period number and the remaining clock into a single counter.

/// Length of a regulation half: 20 minutes.
pub const REGULATION_PERIOD_SECS: u32 = 1200;
/// Length of an overtime period: 5 minutes.
pub const OVERTIME_PERIOD_SECS: u32 = 300;

const REGULATION_PERIODS: u8 = 2;

/// Parse a "M:SS" / "MM:SS" clock into seconds remaining.
///
/// Returns `None` for anything that is not exactly two numeric parts.
pub fn remaining_seconds(clock: &str) -> Option<u32> {
    let (minutes, seconds) = clock.trim().split_once(':')?;
    let minutes = minutes.trim().parse::<u32>().ok()?;
    let seconds = seconds.trim().parse::<u32>().ok()?;
    minutes.checked_mul(60)?.checked_add(seconds)
}

/// Seconds elapsed since tip-off at `clock` remaining in `period`.
///
/// Malformed clocks yield 0; the result never goes below 0. Period 0 (absent
/// in the feed) is read as the first half.
pub fn elapsed_seconds(period: u8, clock: &str) -> u32 {
    let Some(remaining) = remaining_seconds(clock) else {
        return 0;
    };

    let regulation = i64::from(REGULATION_PERIOD_SECS);
    let overtime = i64::from(OVERTIME_PERIOD_SECS);
    let remaining = i64::from(remaining);

    let elapsed = match period {
        0 | 1 => regulation - remaining,
        2 => regulation + (regulation - remaining),
        p => {
            let completed_ots = i64::from(p - REGULATION_PERIODS - 1);
            2 * regulation + completed_ots * overtime + (overtime - remaining)
        }
    };

    u32::try_from(elapsed.max(0)).unwrap_or_default()
}

/// Render an elapsed counter as "M:SS" game time (e.g. 1800 -> "30:00").
pub fn format_elapsed(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Short label for a period: "1H", "2H", "OT", "2OT", ...
pub fn period_label(period: u8) -> String {
    match period {
        0 | 1 => "1H".into(),
        2 => "2H".into(),
        3 => "OT".into(),
        p => format!("{}OT", p - REGULATION_PERIODS),
    }
}
