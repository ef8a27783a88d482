/// ESPN API raw wire types — serde shapes for deserializing ESPN responses.
/// These map to our clean domain types in client.rs.
use serde::{Deserialize, Deserializer};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Scoreboard  (site v2 API)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ScoreboardResponse {
    pub events: Option<Vec<EspnEvent>>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct EspnEvent {
    pub id: Option<String>,
    pub name: Option<String>,
    pub status: Option<EspnStatus>,
    pub competitions: Option<Vec<EspnCompetition>>,
    pub date: Option<String>, // ISO 8601, sometimes without seconds ("2025-03-20T16:15Z")
    pub season: Option<EspnSeason>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EspnSeason {
    pub year: Option<u16>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EspnStatus {
    #[serde(rename = "type")]
    pub status_type: Option<EspnStatusType>,
    pub period: Option<u8>,
    #[serde(rename = "displayClock")]
    pub display_clock: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EspnStatusType {
    pub name: Option<String>, // "STATUS_SCHEDULED", "STATUS_IN_PROGRESS", "STATUS_FINAL"
    pub completed: Option<bool>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct EspnCompetition {
    pub date: Option<String>,
    /// Present on summary headers; scoreboard events carry status one level up.
    pub status: Option<EspnStatus>,
    pub competitors: Option<Vec<EspnCompetitor>>,
    pub venue: Option<EspnVenue>,
    pub notes: Option<Vec<EspnNote>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EspnNote {
    pub headline: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct EspnCompetitor {
    pub id: Option<String>,
    #[serde(rename = "homeAway")]
    pub home_away: Option<String>, // "home" | "away"
    pub team: Option<EspnTeam>,
    pub score: Option<String>, // ESPN sends scores as strings
    pub winner: Option<bool>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EspnTeam {
    pub id: Option<String>,
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
    #[serde(rename = "shortDisplayName")]
    pub short_display_name: Option<String>,
    pub abbreviation: Option<String>,
    #[serde(rename = "conferenceId")]
    pub conference_id: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EspnVenue {
    #[serde(rename = "fullName")]
    pub full_name: Option<String>,
}

// ---------------------------------------------------------------------------
// Game summary  (site v2 API)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct SummaryResponse {
    pub header: Option<EspnHeader>,
    pub plays: Option<Vec<EspnPlay>>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct EspnHeader {
    pub id: Option<String>,
    pub competitions: Option<Vec<EspnCompetition>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EspnPlay {
    pub period: Option<EspnPeriod>,
    pub clock: Option<EspnClock>,
    pub text: Option<String>,
    #[serde(rename = "homeScore", default, deserialize_with = "de_lenient_number")]
    pub home_score: Option<u16>,
    #[serde(rename = "awayScore", default, deserialize_with = "de_lenient_number")]
    pub away_score: Option<u16>,
    pub team: Option<EspnTeamRef>,
    #[serde(rename = "scoringPlay")]
    pub scoring_play: Option<bool>,
    #[serde(rename = "scoreValue", default, deserialize_with = "de_lenient_number")]
    pub score_value: Option<u8>,
    #[serde(rename = "type")]
    pub play_type: Option<EspnPlayType>,
    #[serde(rename = "athletesInvolved")]
    pub athletes_involved: Option<Vec<EspnAthlete>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EspnPeriod {
    #[serde(default, deserialize_with = "de_lenient_number")]
    pub number: Option<u8>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EspnClock {
    #[serde(rename = "displayValue")]
    pub display_value: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EspnTeamRef {
    pub id: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EspnPlayType {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EspnAthlete {
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
}

/// Numbers in play rows occasionally arrive as strings ("71") or junk. Take
/// what parses and drop the rest, so one bad row can't fail the whole summary.
fn de_lenient_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<u64> + std::str::FromStr,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_u64().and_then(|n| T::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<T>().ok(),
        _ => None,
    })
}
