use crate::record::GameRecord;
use crate::stats::RaceStats;
use ncaa_api::GameStatus;
use ncaa_api::clock::{format_elapsed, period_label};
use std::io::{self, Write};

fn status_tag(status: GameStatus) -> &'static str {
    match status {
        GameStatus::Final => "F",
        GameStatus::InProgress => "LIVE",
        GameStatus::Scheduled => "SCHED",
        GameStatus::Postponed => "PPD",
        GameStatus::Canceled => "CANC",
    }
}

/// One human-readable line per game.
pub fn format_record(record: &GameRecord) -> String {
    let game = &record.game;
    let date = game
        .start_time
        .map(|t| t.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "----------".into());
    let mut status = status_tag(game.status).to_owned();
    if game.is_final() && game.is_overtime() {
        status.push_str(&format!("/{}", period_label(game.period)));
    }
    let head = format!(
        "{date}  {:<40} {:>3}-{:<3} {status:<6}",
        game.matchup(),
        game.away_score,
        game.home_score
    );

    let Some(event) = &record.event else {
        return format!("{head} | nobody reached {}", record.threshold);
    };

    let team = record.crossing_team_name().unwrap_or("?");
    let outcome = match record.r69w {
        Some(true) => "R69W",
        Some(false) => "R69L",
        None => "",
    };
    format!(
        "{head} | {team} to {} at {} ({} {}), {:+}, {}-{} {outcome}",
        record.threshold,
        format_elapsed(event.elapsed_seconds),
        period_label(event.period),
        game_clock(event.elapsed_seconds, event.period),
        event.margin,
        event.team_score,
        event.opponent_score,
    )
    .trim_end()
    .to_owned()
}

/// Clock remaining in the crossing period, reconstructed from the elapsed counter.
fn game_clock(elapsed: u32, period: u8) -> String {
    use ncaa_api::clock::{OVERTIME_PERIOD_SECS, REGULATION_PERIOD_SECS};
    let (start, length) = match period {
        0 | 1 => (0, REGULATION_PERIOD_SECS),
        2 => (REGULATION_PERIOD_SECS, REGULATION_PERIOD_SECS),
        p => (
            2 * REGULATION_PERIOD_SECS + u32::from(p - 3) * OVERTIME_PERIOD_SECS,
            OVERTIME_PERIOD_SECS,
        ),
    };
    let remaining = (start + length).saturating_sub(elapsed).min(length);
    format_elapsed(remaining)
}

pub fn write_record(out: &mut impl Write, record: &GameRecord, json: bool) -> io::Result<()> {
    if json {
        serde_json::to_writer(&mut *out, record)?;
        writeln!(out)
    } else {
        writeln!(out, "{}", format_record(record))
    }
}

pub fn write_summary(
    out: &mut impl Write,
    stats: &RaceStats,
    failed: usize,
    json: bool,
) -> io::Result<()> {
    if json {
        let summary = serde_json::json!({ "summary": stats, "failed": failed });
        serde_json::to_writer(&mut *out, &summary)?;
        writeln!(out)
    } else {
        writeln!(out)?;
        write!(out, "{stats}")?;
        if failed > 0 {
            writeln!(out, "Failed fetches:   {failed}")?;
        }
        Ok(())
    }
}
