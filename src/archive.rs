use ncaa_api::Play;
use ncaa_api::clock;
use serde::Serialize;
use std::io::{self, Write};

/// One play as it is archived: the feed row plus both clock readings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayRow {
    pub game_id: String,
    pub sequence: u32,
    pub period: u8,
    /// Seconds left in the period, 0 when the clock could not be read.
    pub clock_seconds: u32,
    /// Seconds since tip-off.
    pub elapsed_seconds: u32,
    pub team_id: Option<String>,
    pub scoring_team_id: Option<String>,
    pub player_name: Option<String>,
    pub event_type: String,
    pub scoring_play: bool,
    pub points_scored: u8,
    pub home_score: u16,
    pub away_score: u16,
    pub description: String,
}

impl PlayRow {
    pub fn new(game_id: &str, play: &Play) -> Self {
        Self {
            game_id: game_id.to_owned(),
            sequence: play.sequence,
            period: play.period,
            clock_seconds: clock::remaining_seconds(&play.clock).unwrap_or(0),
            elapsed_seconds: play.elapsed_seconds(),
            team_id: play.team_id.clone(),
            scoring_team_id: play.scoring_team_id.clone(),
            player_name: play.player_name.clone(),
            event_type: play.event_type.clone(),
            scoring_play: play.scoring_play,
            points_scored: play.points_scored,
            home_score: play.home_score,
            away_score: play.away_score,
            description: play.description.clone(),
        }
    }
}

pub fn rows(game_id: &str, plays: &[Play]) -> Vec<PlayRow> {
    plays.iter().map(|play| PlayRow::new(game_id, play)).collect()
}

/// JSON lines, one play per line.
pub fn write_rows(out: &mut impl Write, rows: &[PlayRow]) -> io::Result<()> {
    for row in rows {
        serde_json::to_writer(&mut *out, row)?;
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(sequence: u32, period: u8, clock: &str) -> Play {
        Play {
            sequence,
            period,
            clock: clock.into(),
            description: "Knox made Three Point Jumper".into(),
            player_name: Some("Amarr Knox".into()),
            home_score: 66,
            away_score: 70,
            team_id: Some("2011".into()),
            scoring_team_id: Some("2011".into()),
            scoring_play: true,
            points_scored: 3,
            event_type: "JumpShot".into(),
        }
    }

    #[test]
    fn rows_carry_both_clock_readings() {
        let row = PlayRow::new("401", &play(7, 2, "0:48"));
        assert_eq!(row.game_id, "401");
        assert_eq!(row.sequence, 7);
        assert_eq!(row.clock_seconds, 48);
        assert_eq!(row.elapsed_seconds, 2352);
        assert_eq!(row.player_name.as_deref(), Some("Amarr Knox"));

        let overtime = PlayRow::new("401", &play(8, 3, "4:00"));
        assert_eq!(overtime.clock_seconds, 240);
        assert_eq!(overtime.elapsed_seconds, 2460);
    }

    #[test]
    fn unreadable_clock_archives_as_zero() {
        let row = PlayRow::new("401", &play(0, 2, "--"));
        assert_eq!(row.clock_seconds, 0);
        assert_eq!(row.elapsed_seconds, 0);
    }

    #[test]
    fn writes_one_json_object_per_play() {
        let plays = vec![play(0, 1, "19:40"), play(1, 1, "19:12")];
        let mut out = Vec::new();
        write_rows(&mut out, &rows("401", &plays)).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<serde_json::Value> =
            text.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["sequence"], 1);
        assert_eq!(lines[1]["clock_seconds"], 1152);
        assert_eq!(lines[1]["elapsed_seconds"], 48);
        assert_eq!(lines[0]["event_type"], "JumpShot");
    }
}
