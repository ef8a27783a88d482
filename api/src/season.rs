//! College basketball season labels and date ranges.
//!
//! A season runs from November 1 through April 10 of the following year and is
//! labelled by both years, e.g. "2024-25".

use chrono::{Datelike, NaiveDate};

const SEASON_START: (u32, u32) = (11, 1);
const SEASON_END: (u32, u32) = (4, 10);

/// Label of the season a game played on `date` belongs to.
///
/// January through April belong to the season that started the previous
/// November; everything else is filed under the season starting that year.
pub fn season_label(date: NaiveDate) -> String {
    let start_year = if date.month() <= 4 { date.year() - 1 } else { date.year() };
    label_for(start_year)
}

fn label_for(start_year: i32) -> String {
    // Two-digit suffix of the following year; avoids the `+ 1` at i32::MAX.
    format!("{}-{:02}", start_year, (start_year.rem_euclid(100) + 1) % 100)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Season {
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Season {
    fn starting(start_year: i32, today: NaiveDate) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(start_year, SEASON_START.0, SEASON_START.1)?;
        let end = NaiveDate::from_ymd_opt(start_year.checked_add(1)?, SEASON_END.0, SEASON_END.1)?;
        if start > today {
            return None;
        }
        Some(Self { label: label_for(start_year), start, end: end.min(today) })
    }

    /// Parse a "2015-16" label. Future seasons yield `None`; a season still
    /// in progress ends at `today`.
    pub fn parse(label: &str, today: NaiveDate) -> Option<Self> {
        let (start, end) = label.trim().split_once('-')?;
        let start_year = start.parse::<i32>().ok()?;
        let end_suffix = end.parse::<i32>().ok()?;
        let next_year = start_year.checked_add(1)?;
        let expected = if end.len() == 2 { next_year.rem_euclid(100) } else { next_year };
        if end_suffix != expected {
            return None;
        }
        Self::starting(start_year, today)
    }

    /// The `count` most recent seasons, oldest first.
    pub fn recent(count: usize, today: NaiveDate) -> Vec<Self> {
        // October still belongs to the previous (unstarted) season.
        let latest = if today.month() >= 10 { today.year() } else { today.year() - 1 };
        (0..count)
            .rev()
            .filter_map(|back| {
                let back = i32::try_from(back).ok()?;
                Self::starting(latest.checked_sub(back)?, today)
            })
            .collect()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(|d| *d <= self.end)
    }
}
