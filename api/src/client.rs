use crate::espn::{
    EspnCompetition, EspnCompetitor, EspnEvent, EspnStatus, ScoreboardResponse, SummaryResponse,
};
use crate::season::season_label;
use crate::{Game, GameDetail, GameStatus, GameType, League, Play, Team};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use log::debug;
use reqwest::Client;
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

const ESPN_SITE_V2: &str = "https://site.api.espn.com/apis/site/v2/sports/basketball";
/// groups=50 is all of Division I; without it ESPN only lists featured games.
const DIVISION_ONE_GROUP: u32 = 50;
const SCOREBOARD_LIMIT: u32 = 200;

/// College basketball client backed by ESPN's public endpoints.
#[derive(Debug, Clone)]
pub struct NcaaApi {
    client: Client,
    timeout: Duration,
    base_url: String,
    league: League,
}

impl Default for NcaaApi {
    fn default() -> Self {
        Self {
            client: Client::builder()
                .user_agent(concat!("ncaa-api/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_default(),
            timeout: Duration::from_secs(10),
            base_url: ESPN_SITE_V2.to_owned(),
            league: League::default(),
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Api(reqwest::Error, String),
    Parsing(reqwest::Error, String),
    NotFound(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Api(e, url) => write!(f, "API error for {url}: {e}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::NotFound(msg) => write!(f, "Not found: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl NcaaApi {
    pub fn new(league: League) -> Self {
        Self { league, ..Self::default() }
    }

    /// Point the client at another host serving ESPN-shaped payloads.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    /// Per-request timeout, 10s unless set.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fetch every Division I game on `date`.
    pub async fn fetch_scoreboard(&self, date: NaiveDate) -> ApiResult<Vec<Game>> {
        let url = format!(
            "{}/{}/scoreboard?dates={}&limit={SCOREBOARD_LIMIT}&groups={DIVISION_ONE_GROUP}",
            self.base_url,
            self.league.path(),
            date.format("%Y%m%d"),
        );
        let raw: ScoreboardResponse = self.get(&url).await?;
        let games = raw
            .events
            .unwrap_or_default()
            .iter()
            .map(|event| map_event_to_game(event, self.league))
            .collect();
        Ok(games)
    }

    /// Fetch the play-by-play for a single game.
    pub async fn fetch_game_detail(&self, game_id: &str) -> ApiResult<GameDetail> {
        if game_id.trim().is_empty() {
            return Err(ApiError::NotFound("empty game id".into()));
        }
        let url = format!("{}/{}/summary?event={game_id}", self.base_url, self.league.path());
        let raw: SummaryResponse = self.get(&url).await?;
        Ok(map_summary(game_id, raw, self.league))
    }

    async fn get<T: Default + serde::de::DeserializeOwned>(&self, url: &str) -> ApiResult<T> {
        debug!("GET {url}");
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?;

        match response.error_for_status() {
            Ok(res) => res
                .json::<T>()
                .await
                .map_err(|e| ApiError::Parsing(e, url.to_owned())),
            Err(e) => {
                if e.status().map(|s| s.is_client_error()).unwrap_or(false) {
                    debug!("{url} returned {:?}, treating as empty", e.status());
                    Ok(T::default())
                } else {
                    Err(ApiError::Api(e, url.to_owned()))
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Mapping: ESPN wire types → clean domain types
// ---------------------------------------------------------------------------

fn parse_start_time(date: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(date) {
        return Some(dt.with_timezone(&Utc));
    }
    // Scoreboard dates usually drop the seconds: "2025-03-20T16:15Z".
    NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%MZ")
        .ok()
        .map(|naive| naive.and_utc())
}

fn map_event_to_game(event: &EspnEvent, league: League) -> Game {
    let competition = event.competitions.as_deref().and_then(<[_]>::first);
    build_game(
        event.id.clone().unwrap_or_default(),
        event.status.as_ref(),
        event.date.as_deref(),
        competition,
        league,
    )
}

fn build_game(
    id: String,
    status: Option<&EspnStatus>,
    date: Option<&str>,
    competition: Option<&EspnCompetition>,
    league: League,
) -> Game {
    let status_type = status.and_then(|s| s.status_type.as_ref());
    let game_status = status_type
        .and_then(|t| t.name.as_deref())
        .map(parse_status)
        .unwrap_or_default();
    let game_status = match (game_status, status_type.and_then(|t| t.completed)) {
        (GameStatus::Scheduled, Some(true)) => GameStatus::Final,
        (game_status, _) => game_status,
    };

    let period = status.and_then(|s| s.period).unwrap_or_default();
    let clock = status.and_then(|s| s.display_clock.clone());

    let start_time = date.and_then(parse_start_time);
    let season = start_time.map(|dt| season_label(dt.date_naive()));

    let venue = competition
        .and_then(|c| c.venue.as_ref())
        .and_then(|v| v.full_name.clone());
    let game_type = competition.map(game_type_from_notes).unwrap_or_default();

    let competitors = competition
        .and_then(|c| c.competitors.as_deref())
        .unwrap_or_default();
    let (home, away) = split_competitors(competitors);

    Game {
        id,
        league,
        start_time,
        season,
        home: home.map(map_team).unwrap_or_default(),
        away: away.map(map_team).unwrap_or_default(),
        home_score: home.map(parse_score).unwrap_or_default(),
        away_score: away.map(parse_score).unwrap_or_default(),
        status: game_status,
        period,
        clock,
        venue,
        game_type,
    }
}

/// Use "home"/"away" markers; fall back to index order.
fn split_competitors(
    competitors: &[EspnCompetitor],
) -> (Option<&EspnCompetitor>, Option<&EspnCompetitor>) {
    let home = competitors
        .iter()
        .find(|c| c.home_away.as_deref() == Some("home"))
        .or_else(|| competitors.first());
    let away = competitors
        .iter()
        .find(|c| c.home_away.as_deref() == Some("away"))
        .or_else(|| competitors.get(1));
    (home, away)
}

fn parse_score(c: &EspnCompetitor) -> u16 {
    c.score
        .as_deref()
        .and_then(|s| s.trim().parse::<u16>().ok())
        .unwrap_or_default()
}

fn competitor_id(c: &EspnCompetitor) -> String {
    c.id
        .clone()
        .or_else(|| c.team.as_ref().and_then(|t| t.id.clone()))
        .unwrap_or_default()
}

fn map_team(c: &EspnCompetitor) -> Team {
    let id = competitor_id(c);
    match &c.team {
        Some(t) => Team {
            id,
            name: t.display_name.clone().unwrap_or_default(),
            short_name: t
                .short_display_name
                .clone()
                .unwrap_or_else(|| t.display_name.clone().unwrap_or_default()),
            abbrev: t.abbreviation.clone().unwrap_or_default(),
            conference_id: t.conference_id.clone(),
        },
        None => Team { id, ..Default::default() },
    }
}

fn game_type_from_notes(competition: &EspnCompetition) -> GameType {
    for note in competition.notes.iter().flatten() {
        let headline = note.headline.as_deref().unwrap_or("").to_lowercase();
        if headline.contains("tournament") || headline.contains("championship") {
            return GameType::Tournament;
        }
        if headline.contains("conference") {
            return GameType::Conference;
        }
    }
    GameType::Regular
}

fn parse_status(s: &str) -> GameStatus {
    match s {
        "STATUS_IN_PROGRESS" | "STATUS_HALFTIME" | "STATUS_END_PERIOD" => GameStatus::InProgress,
        "STATUS_FINAL" | "STATUS_FINAL_OT" => GameStatus::Final,
        "STATUS_POSTPONED" | "STATUS_SUSPENDED" | "STATUS_DELAYED" => GameStatus::Postponed,
        "STATUS_CANCELED" | "STATUS_CANCELLED" | "STATUS_FORFEIT" => GameStatus::Canceled,
        _ => GameStatus::Scheduled,
    }
}

fn map_summary(game_id: &str, raw: SummaryResponse, league: League) -> GameDetail {
    let competition = raw
        .header
        .as_ref()
        .and_then(|h| h.competitions.as_deref())
        .and_then(<[_]>::first);
    let game = build_game(
        game_id.to_owned(),
        competition.and_then(|c| c.status.as_ref()),
        competition.and_then(|c| c.date.as_deref()),
        competition,
        league,
    );

    let plays = raw
        .plays
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(i, p)| {
            let team_id = p.team.and_then(|t| t.id);
            let scoring_play = p.scoring_play.unwrap_or_default();
            Play {
                sequence: u32::try_from(i).unwrap_or(u32::MAX),
                period: p.period.and_then(|x| x.number).unwrap_or_default(),
                clock: p.clock.and_then(|c| c.display_value).unwrap_or_default(),
                description: p.text.unwrap_or_default(),
                player_name: p
                    .athletes_involved
                    .and_then(|a| a.into_iter().next())
                    .and_then(|a| a.display_name),
                home_score: p.home_score.unwrap_or_default(),
                away_score: p.away_score.unwrap_or_default(),
                scoring_team_id: team_id.clone().filter(|_| scoring_play),
                team_id,
                scoring_play,
                points_scored: if scoring_play { p.score_value.unwrap_or_default() } else { 0 },
                event_type: p
                    .play_type
                    .and_then(|t| t.text)
                    .unwrap_or_else(|| "unknown".into()),
            }
        })
        .collect();

    GameDetail {
        game_id: game_id.to_owned(),
        home_team_id: game.home.id.clone(),
        away_team_id: game.away.id.clone(),
        game,
        plays,
    }
}
