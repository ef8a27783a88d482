//! Per-game analytics around the race: how the lead moved, how fast the game
//! was played and what happened after the first team reached the mark.

use crate::clock;
use crate::r69::ThresholdEvent;
use crate::{Game, Play, Side};
use serde::{Deserialize, Serialize};

/// Typical time to 69, the baseline `pace_index` compares against.
pub const BASELINE_SECS_TO_MARK: u32 = 1800;

const NICE_SCORES: [u16; 2] = [69, 96];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Leader {
    Home,
    Away,
    Tied,
}

impl Leader {
    fn of(play: &Play) -> Self {
        match play.home_score.cmp(&play.away_score) {
            std::cmp::Ordering::Greater => Leader::Home,
            std::cmp::Ordering::Less => Leader::Away,
            std::cmp::Ordering::Equal => Leader::Tied,
        }
    }
}

fn leads(side: Side, play: &Play) -> bool {
    match side {
        Side::Home => play.home_score > play.away_score,
        Side::Away => play.away_score > play.home_score,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameAnalytics {
    /// Either final score is 69 or 96.
    pub nice_score: bool,
    /// Both teams finished on 69 or more.
    pub double_nice: bool,
    pub lead_changes: u32,
    /// Times the score was level again after tip-off.
    pub ties: u32,
    pub biggest_home_lead: u16,
    pub biggest_away_lead: u16,
    /// Shots and turnovers, a rough possession count.
    pub home_possessions: u32,
    pub away_possessions: u32,
    /// Points per 40 minutes.
    pub pace_rating: f64,
    /// Only present when someone reached the mark.
    pub race: Option<RaceAnalytics>,
}

impl GameAnalytics {
    pub fn of(game: &Game, plays: &[Play], home_team_id: &str, away_team_id: &str) -> Self {
        let (biggest_home_lead, biggest_away_lead) = biggest_leads(plays);
        Self {
            nice_score: NICE_SCORES.contains(&game.home_score)
                || NICE_SCORES.contains(&game.away_score),
            double_nice: game.home_score >= 69 && game.away_score >= 69,
            lead_changes: lead_changes(plays),
            ties: ties(plays),
            biggest_home_lead,
            biggest_away_lead,
            home_possessions: possessions(plays, home_team_id),
            away_possessions: possessions(plays, away_team_id),
            pace_rating: pace_rating(game, plays),
            race: None,
        }
    }

    pub fn biggest_lead(&self) -> u16 {
        self.biggest_home_lead.max(self.biggest_away_lead)
    }
}

/// A change of leader, looking through ties: home, tied, away is one change.
pub fn lead_changes(plays: &[Play]) -> u32 {
    let mut last_leader = None;
    let mut changes = 0;
    for leader in plays.iter().map(Leader::of) {
        if leader == Leader::Tied {
            continue;
        }
        if last_leader.is_some_and(|last| last != leader) {
            changes += 1;
        }
        last_leader = Some(leader);
    }
    changes
}

/// The opening 0-0 is not counted.
pub fn ties(plays: &[Play]) -> u32 {
    let mut tied = true;
    let mut ties = 0;
    for play in plays {
        let now_tied = Leader::of(play) == Leader::Tied;
        if now_tied && !tied {
            ties += 1;
        }
        tied = now_tied;
    }
    ties
}

fn biggest_leads(plays: &[Play]) -> (u16, u16) {
    plays.iter().fold((0, 0), |(home, away), play| {
        let lead = play.home_score.abs_diff(play.away_score);
        match Leader::of(play) {
            Leader::Home => (home.max(lead), away),
            Leader::Away => (home, away.max(lead)),
            Leader::Tied => (home, away),
        }
    })
}

fn possessions(plays: &[Play], team_id: &str) -> u32 {
    if team_id.is_empty() {
        return 0;
    }
    let count = plays
        .iter()
        .filter(|p| p.team_id.as_deref() == Some(team_id))
        .filter(|p| {
            let kind = p.event_type.to_ascii_lowercase();
            kind.contains("shot") || kind.contains("turnover")
        })
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

fn pace_rating(game: &Game, plays: &[Play]) -> f64 {
    let played = plays
        .last()
        .map(Play::elapsed_seconds)
        .filter(|&secs| secs > 0)
        .unwrap_or(2 * clock::REGULATION_PERIOD_SECS);
    let points = f64::from(game.home_score) + f64::from(game.away_score);
    points / (f64::from(played) / 60.0) * 40.0
}

/// What happened after the first team reached the mark.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RaceAnalytics {
    /// Baseline time to the mark over this game's. Above 1 is quicker than usual.
    pub pace_index: f64,
    /// Seconds the crossing team spent in front after crossing.
    pub lead_duration: u32,
    /// Final margin minus the margin at the crossing, from the crossing
    /// team's side. `None` until the game has a winner.
    pub swing_margin: Option<i32>,
    /// The crossing team fell level or behind afterwards and then led again.
    pub comeback: bool,
}

impl RaceAnalytics {
    /// `r69w` is the crossing team's result, when known.
    pub fn of(event: &ThresholdEvent, plays: &[Play], game: &Game, r69w: Option<bool>) -> Self {
        let crossed_at = event.elapsed_seconds;
        let after: Vec<(u32, &Play)> = plays
            .iter()
            .map(|p| (p.elapsed_seconds(), p))
            .filter(|(secs, _)| *secs > crossed_at)
            .collect();

        let pace_index = if crossed_at == 0 {
            0.0
        } else {
            f64::from(BASELINE_SECS_TO_MARK) / f64::from(crossed_at)
        };

        Self {
            pace_index,
            lead_duration: lead_duration(&after, event.side, crossed_at),
            swing_margin: r69w.map(|won| {
                let final_margin = i32::from(game.final_margin());
                let signed = if won { final_margin } else { -final_margin };
                signed - event.margin
            }),
            comeback: comeback(&after, event.side),
        }
    }
}

fn lead_duration(after: &[(u32, &Play)], side: Side, crossed_at: u32) -> u32 {
    let mut last = crossed_at;
    let mut ahead = 0;
    for &(secs, play) in after {
        if leads(side, play) {
            ahead += secs.saturating_sub(last);
        }
        last = secs;
    }
    ahead
}

fn comeback(after: &[(u32, &Play)], side: Side) -> bool {
    let mut lost = false;
    for (_, play) in after {
        match (leads(side, play), lost) {
            (false, _) => lost = true,
            (true, true) => return true,
            (true, false) => {}
        }
    }
    false
}
