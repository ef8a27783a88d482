//! Race-to-69 detection.
//!
//! Scans a game's play-by-play once, in feed order, and reports the first team
//! whose running score reaches the threshold. The event is single-shot: once a
//! side has crossed, later crossings by the other side are ignored.

use crate::clock;
use crate::{Play, Side};
use serde::{Deserialize, Serialize};

pub const DEFAULT_THRESHOLD: u16 = 69;

/// Converts `(period, clock remaining)` into elapsed game seconds.
pub type ClockFn = fn(u8, &str) -> u32;

/// The moment a team first reached the threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdEvent {
    pub team_id: String,
    pub side: Side,
    pub elapsed_seconds: u32,
    pub period: u8,
    /// Crossing team's points minus the opponent's, at the crossing play.
    pub margin: i32,
    pub team_score: u16,
    pub opponent_score: u16,
    pub description: String,
}

impl ThresholdEvent {
    pub fn is_home(&self) -> bool {
        self.side == Side::Home
    }

    /// Whether the crossing team went on to win (R69W).
    ///
    /// `None` when the final score is level, i.e. there is no winner yet.
    pub fn won_game(&self, final_home: u16, final_away: u16) -> Option<bool> {
        let (ours, theirs) = match self.side {
            Side::Home => (final_home, final_away),
            Side::Away => (final_away, final_home),
        };
        (ours != theirs).then_some(ours > theirs)
    }
}

/// Scan progress. There is no way back out of `Resolved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum ScanState {
    #[default]
    NoneCrossed,
    Resolved(Side),
}

impl ScanState {
    /// Feed one play. Returns the side that crossed on this play, if any.
    ///
    /// Home is checked before away, so a play where both scores already meet
    /// the threshold resolves to home.
    fn advance(&mut self, home_score: u16, away_score: u16, threshold: u16) -> Option<Side> {
        if let ScanState::Resolved(_) = self {
            return None;
        }
        let crossed = if home_score >= threshold {
            Side::Home
        } else if away_score >= threshold {
            Side::Away
        } else {
            return None;
        };
        *self = ScanState::Resolved(crossed);
        Some(crossed)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Detector {
    pub threshold: u16,
    pub clock: ClockFn,
}

impl Default for Detector {
    fn default() -> Self {
        Self { threshold: DEFAULT_THRESHOLD, clock: clock::elapsed_seconds }
    }
}

impl Detector {
    pub fn new(threshold: u16) -> Self {
        Self { threshold, ..Self::default() }
    }

    pub fn with_clock(mut self, clock: ClockFn) -> Self {
        self.clock = clock;
        self
    }

    /// Find the first team to reach the threshold, in play order.
    ///
    /// Plays are trusted to be chronological. Empty input yields `None`, as
    /// does a game where neither side gets there.
    pub fn detect<'a, I>(
        &self,
        plays: I,
        home_team_id: &str,
        away_team_id: &str,
    ) -> Option<ThresholdEvent>
    where
        I: IntoIterator<Item = &'a Play>,
    {
        let mut state = ScanState::default();
        plays.into_iter().find_map(|play| {
            let side = state.advance(play.home_score, play.away_score, self.threshold)?;
            let (team_id, team_score, opponent_score) = match side {
                Side::Home => (home_team_id, play.home_score, play.away_score),
                Side::Away => (away_team_id, play.away_score, play.home_score),
            };
            Some(ThresholdEvent {
                team_id: team_id.to_owned(),
                side,
                elapsed_seconds: (self.clock)(play.period, &play.clock),
                period: play.period,
                margin: i32::from(team_score) - i32::from(opponent_score),
                team_score,
                opponent_score,
                description: play.description.clone(),
            })
        })
    }
}

/// [`Detector::detect`] with the standard game clock.
pub fn detect(
    plays: &[Play],
    home_team_id: &str,
    away_team_id: &str,
    threshold: u16,
) -> Option<ThresholdEvent> {
    Detector::new(threshold).detect(plays, home_team_id, away_team_id)
}
