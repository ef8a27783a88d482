use crate::archive::{self, PlayRow};
use ncaa_api::analytics::{GameAnalytics, RaceAnalytics};
use ncaa_api::r69::{Detector, ThresholdEvent};
use ncaa_api::{Game, GameDetail, Side};
use serde::Serialize;

/// Everything we learned about one game: the scoreboard row, how many plays
/// were scanned and the race outcome, if any.
#[derive(Debug, Clone, Serialize)]
pub struct GameRecord {
    pub game: Game,
    pub play_count: usize,
    pub threshold: u16,
    pub event: Option<ThresholdEvent>,
    /// Crossing team won. Only set once the game is final.
    pub r69w: Option<bool>,
    pub analytics: GameAnalytics,
    /// Play rows waiting to be archived; emptied once written.
    #[serde(skip)]
    pub plays: Vec<PlayRow>,
}

impl GameRecord {
    pub fn build(game: Game, detail: &GameDetail, detector: &Detector) -> Self {
        // The summary header knows the teams even when the scoreboard row was thin.
        let home_id = non_empty(&detail.home_team_id).unwrap_or(&game.home.id);
        let away_id = non_empty(&detail.away_team_id).unwrap_or(&game.away.id);

        let event = detector.detect(&detail.plays, home_id, away_id);
        let r69w = event
            .as_ref()
            .filter(|_| game.is_final())
            .and_then(|e| e.won_game(game.home_score, game.away_score));

        let mut analytics = GameAnalytics::of(&game, &detail.plays, home_id, away_id);
        analytics.race = event
            .as_ref()
            .map(|e| RaceAnalytics::of(e, &detail.plays, &game, r69w));

        Self {
            play_count: detail.plays.len(),
            threshold: detector.threshold,
            event,
            r69w,
            analytics,
            plays: Vec::new(),
            game,
        }
    }

    /// Keep the play rows so they can be archived alongside the record.
    pub fn with_plays(mut self, detail: &GameDetail) -> Self {
        self.plays = archive::rows(&self.game.id, &detail.plays);
        self
    }

    pub fn crossing_team_name(&self) -> Option<&str> {
        let side: Side = self.event.as_ref()?.side;
        let team = self.game.team(side);
        let name = if team.short_name.is_empty() { &team.name } else { &team.short_name };
        Some(name.as_str())
    }
}

fn non_empty(s: &str) -> Option<&str> {
    (!s.trim().is_empty()).then_some(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ncaa_api::{GameStatus, Play, Team};

    fn game(status: GameStatus, home_score: u16, away_score: u16) -> Game {
        Game {
            id: "401".into(),
            home: Team { id: "10".into(), short_name: "Duke".into(), ..Default::default() },
            away: Team { id: "20".into(), short_name: "UNC".into(), ..Default::default() },
            home_score,
            away_score,
            status,
            ..Default::default()
        }
    }

    fn detail(home_id: &str, plays: &[(u16, u16)]) -> GameDetail {
        GameDetail {
            game_id: "401".into(),
            home_team_id: home_id.into(),
            away_team_id: String::new(),
            plays: plays
                .iter()
                .map(|&(h, a)| Play {
                    home_score: h,
                    away_score: a,
                    period: 2,
                    clock: "3:00".into(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn final_game_gets_r69w() {
        let record = GameRecord::build(
            game(GameStatus::Final, 75, 80),
            &detail("10", &[(60, 60), (69, 66)]),
            &Detector::default(),
        );
        let event = record.event.as_ref().unwrap();
        assert_eq!(event.team_id, "10");
        assert_eq!(record.r69w, Some(false));
        assert_eq!(record.crossing_team_name(), Some("Duke"));
        assert_eq!(record.play_count, 2);
        assert!(record.plays.is_empty());

        let race = record.analytics.race.unwrap();
        assert_eq!(race.swing_margin, Some(-5 - 3));
        assert_eq!(record.analytics.biggest_home_lead, 3);
    }

    #[test]
    fn plays_are_kept_for_archiving_on_request() {
        let detail = detail("10", &[(60, 60), (69, 66)]);
        let game = game(GameStatus::Final, 75, 80);
        let record = GameRecord::build(game, &detail, &Detector::default()).with_plays(&detail);
        assert_eq!(record.plays.len(), 2);
        assert_eq!(record.plays[1].game_id, "401");
        assert_eq!(record.plays[1].elapsed_seconds, 2220);
        assert_eq!(record.plays[1].clock_seconds, 180);

        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("plays").is_none());
        assert_eq!(json["analytics"]["race"]["comeback"], false);
    }

    #[test]
    fn live_game_has_no_r69w_yet() {
        let record = GameRecord::build(
            game(GameStatus::InProgress, 69, 66),
            &detail("10", &[(69, 66)]),
            &Detector::default(),
        );
        assert!(record.event.is_some());
        assert_eq!(record.r69w, None);
    }

    #[test]
    fn scoreboard_ids_fill_missing_summary_ids() {
        let record = GameRecord::build(
            game(GameStatus::Final, 70, 72),
            &detail("", &[(50, 69)]),
            &Detector::default(),
        );
        let event = record.event.unwrap();
        assert_eq!(event.team_id, "20");
        assert_eq!(record.r69w, Some(true));
    }

    #[test]
    fn no_race_no_outcome() {
        let record = GameRecord::build(
            game(GameStatus::Final, 60, 58),
            &detail("10", &[(60, 58)]),
            &Detector::default(),
        );
        assert!(record.event.is_none());
        assert!(record.r69w.is_none());
        assert!(record.analytics.race.is_none());
        assert!(record.crossing_team_name().is_none());
    }
}
