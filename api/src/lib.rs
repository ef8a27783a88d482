pub mod analytics;
pub mod client;
pub mod clock;
pub mod espn;
pub mod r69;
pub mod season;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Domain types — clean model, independent of ESPN wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum League {
    #[default]
    Mens,
    Womens,
}

impl League {
    /// Path segment used by ESPN's site API.
    pub fn path(&self) -> &'static str {
        match self {
            League::Mens => "mens-college-basketball",
            League::Womens => "womens-college-basketball",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            League::Mens => "Men's",
            League::Womens => "Women's",
        }
    }
}

impl std::str::FromStr for League {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mens" | "men" | "m" => Ok(League::Mens),
            "womens" | "women" | "w" => Ok(League::Womens),
            other => Err(format!("unknown league '{other}' (expected mens or womens)")),
        }
    }
}

/// Which side of the scoreboard a team is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Home,
    Away,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,       // "Duke Blue Devils"
    pub short_name: String, // "Duke"
    pub abbrev: String,     // "DUKE"
    pub conference_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    #[default]
    Scheduled,
    InProgress,
    Final,
    Postponed,
    Canceled,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameType {
    #[default]
    Regular,
    Conference,
    Tournament,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Game {
    pub id: String,
    pub league: League,
    pub start_time: Option<DateTime<Utc>>,
    /// "2024-25" style label.
    pub season: Option<String>,
    pub home: Team,
    pub away: Team,
    pub home_score: u16,
    pub away_score: u16,
    pub status: GameStatus,
    pub period: u8,
    pub clock: Option<String>,
    pub venue: Option<String>,
    pub game_type: GameType,
}

impl Game {
    pub fn is_final(&self) -> bool {
        self.status == GameStatus::Final
    }

    /// Only started games have play-by-play worth fetching.
    pub fn has_plays(&self) -> bool {
        matches!(self.status, GameStatus::InProgress | GameStatus::Final)
    }

    pub fn is_overtime(&self) -> bool {
        self.period > 2
    }

    pub fn final_margin(&self) -> u16 {
        self.home_score.abs_diff(self.away_score)
    }

    pub fn team(&self, side: Side) -> &Team {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }

    pub fn matchup(&self) -> String {
        format!("{} @ {}", display_name(&self.away), display_name(&self.home))
    }
}

fn display_name(team: &Team) -> &str {
    if !team.short_name.is_empty() {
        &team.short_name
    } else if !team.name.is_empty() {
        &team.name
    } else {
        "TBD"
    }
}

/// Play-by-play for a single game, fetched on demand.
#[derive(Debug, Clone, Default)]
pub struct GameDetail {
    pub game_id: String,
    /// Scoreboard view of the game, rebuilt from the summary header.
    pub game: Game,
    pub home_team_id: String,
    pub away_team_id: String,
    pub plays: Vec<Play>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Play {
    /// Position in the feed, 0-based.
    pub sequence: u32,
    pub period: u8,
    /// Time remaining in the period, "M:SS".
    pub clock: String,
    pub description: String,
    /// First athlete credited on the play.
    pub player_name: Option<String>,
    pub home_score: u16,
    pub away_score: u16,
    pub team_id: Option<String>,
    pub scoring_team_id: Option<String>,
    pub scoring_play: bool,
    pub points_scored: u8,
    pub event_type: String,
}

impl Play {
    pub fn elapsed_seconds(&self) -> u32 {
        clock::elapsed_seconds(self.period, &self.clock)
    }
}
