use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use ncaa_api::League;
use ncaa_api::r69::DEFAULT_THRESHOLD;

/// Race-to-69 tracker for NCAA basketball.
///
/// Pulls play-by-play from ESPN and reports, for every game, the first team to
/// reach 69 points: when it happened, the margin at that moment and whether
/// that team went on to win (R69W).
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Men's or women's college basketball.
    #[arg(long, short = 'L', global = true, env = "R69W_LEAGUE", default_value = "mens")]
    pub league: League,

    /// Points a team has to reach. 69 unless you are tracking another race.
    #[arg(
        long,
        short,
        global = true,
        env = "R69W_THRESHOLD",
        default_value_t = DEFAULT_THRESHOLD
    )]
    pub threshold: u16,

    /// How many game summaries to fetch at once.
    #[arg(
        long,
        short,
        global = true,
        env = "R69W_CONCURRENCY",
        default_value_t = 4,
        value_parser = clap::value_parser!(u16).range(1..=32)
    )]
    pub concurrency: u16,

    /// Seconds to wait on a single ESPN request.
    #[arg(
        long,
        global = true,
        env = "R69W_TIMEOUT",
        default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(1..=300)
    )]
    pub timeout: u64,

    /// Also archive every scanned play to this file, one JSON object per line.
    #[arg(long, global = true, env = "R69W_PLAYS", value_name = "FILE")]
    pub plays: Option<PathBuf>,

    /// Emit one JSON object per game instead of text lines.
    #[arg(long, global = true)]
    pub json: bool,

    /// Log filter, e.g. "debug" or "ncaa_api=debug,r69w=info".
    #[arg(long, global = true, env = "R69W_LOG", default_value = "warn")]
    pub log_level: String,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Detect the race in a single game by ESPN event id.
    Game {
        game_id: String,
    },
    /// Every started or finished game on a day (defaults to today).
    Date {
        #[arg(value_parser = parse_date)]
        date: Option<NaiveDate>,
    },
    /// Backfill one season, e.g. "2023-24".
    Season {
        label: String,
    },
    /// Backfill the last N seasons, oldest first.
    Seasons {
        #[arg(value_parser = clap::value_parser!(u16).range(1..=20))]
        count: u16,
    },
    /// Rescan today's games periodically and report each race once.
    Watch {
        /// Seconds between scoreboard refreshes.
        #[arg(long, short, default_value_t = 30)]
        interval: u64,
    },
}

/// Accepts "2025-03-20" or ESPN's "20250320".
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y%m%d"))
        .map_err(|_| format!("invalid date '{s}', expected YYYY-MM-DD"))
}
