use crate::record::GameRecord;
use crate::state::app_settings::AppSettings;
use crate::state::messages::{IngestRequest, IngestResponse};
use chrono::NaiveDate;
use futures_util::StreamExt;
use futures_util::stream;
use log::{debug, error, info, warn};
use ncaa_api::{Game, GameDetail};
use ncaa_api::client::{ApiError, NcaaApi};
use ncaa_api::r69::Detector;
use tokio::sync::mpsc;

/// Owns all ESPN traffic. Pulls requests off one channel, pushes results onto
/// another, and exits when the request side hangs up.
pub struct IngestWorker {
    client: NcaaApi,
    detector: Detector,
    concurrency: usize,
    archive_plays: bool,
    requests: mpsc::Receiver<IngestRequest>,
    responses: mpsc::Sender<IngestResponse>,
}

impl IngestWorker {
    pub fn new(
        settings: &AppSettings,
        requests: mpsc::Receiver<IngestRequest>,
        responses: mpsc::Sender<IngestResponse>,
    ) -> Self {
        let client = NcaaApi::new(settings.league).with_timeout(settings.request_timeout);
        Self::with_client(client, settings, requests, responses)
    }

    pub fn with_client(
        client: NcaaApi,
        settings: &AppSettings,
        requests: mpsc::Receiver<IngestRequest>,
        responses: mpsc::Sender<IngestResponse>,
    ) -> Self {
        Self {
            client,
            detector: Detector::new(settings.threshold),
            concurrency: settings.concurrency.max(1),
            archive_plays: settings.archive_plays(),
            requests,
            responses,
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            let result = match request {
                IngestRequest::ScanGame { game_id } => self.handle_scan_game(&game_id).await,
                IngestRequest::ScanDate { date } => self.handle_scan_date(date).await,
            };

            let response = result.unwrap_or_else(|err| IngestResponse::Error {
                message: err.to_string(),
            });

            if let Err(e) = self.responses.send(response).await {
                error!("Failed to send ingest response: {e}");
                break;
            }
        }
        debug!("ingest worker shutting down");
    }

    async fn handle_scan_game(&self, game_id: &str) -> Result<IngestResponse, ApiError> {
        debug!("scanning game {game_id}");
        let detail = self.client.fetch_game_detail(game_id).await?;
        if detail.plays.is_empty() {
            return Err(ApiError::NotFound(format!("no play-by-play for game {game_id}")));
        }
        let record = self.record(detail.game.clone(), &detail);
        Ok(IngestResponse::GameScanned { record })
    }

    async fn handle_scan_date(&self, date: NaiveDate) -> Result<IngestResponse, ApiError> {
        let games: Vec<Game> = self
            .client
            .fetch_scoreboard(date)
            .await?
            .into_iter()
            .filter(Game::has_plays)
            .collect();
        info!("{date}: {} started games", games.len());

        let results: Vec<Result<GameRecord, ApiError>> = stream::iter(games)
            .map(|game| self.scan(game))
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut failed = 0;
        let mut records = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!("{date}: skipping game: {e}");
                    failed += 1;
                }
            }
        }
        // buffer_unordered finishes in whatever order ESPN answers.
        records.sort_by(|a, b| {
            a.game
                .start_time
                .cmp(&b.game.start_time)
                .then_with(|| a.game.id.cmp(&b.game.id))
        });

        Ok(IngestResponse::DateScanned { date, records, failed })
    }

    async fn scan(&self, game: Game) -> Result<GameRecord, ApiError> {
        let detail = self.client.fetch_game_detail(&game.id).await?;
        debug!("game {}: {} plays", game.id, detail.plays.len());
        Ok(self.record(game, &detail))
    }

    fn record(&self, game: Game, detail: &GameDetail) -> GameRecord {
        let record = GameRecord::build(game, detail, &self.detector);
        if self.archive_plays { record.with_plays(detail) } else { record }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ncaa_api::League;

    const SCOREBOARD: &str = r#"{ "events": [
        { "id": "1", "date": "2025-01-11T17:00Z",
          "status": { "period": 2, "type": { "name": "STATUS_FINAL" } },
          "competitions": [{ "competitors": [
              { "id": "10", "homeAway": "home", "score": "80",
                "team": { "id": "10", "shortDisplayName": "Duke" } },
              { "id": "20", "homeAway": "away", "score": "71",
                "team": { "id": "20", "shortDisplayName": "UNC" } } ] }] },
        { "id": "2", "date": "2025-01-11T23:00Z",
          "status": { "type": { "name": "STATUS_SCHEDULED" } },
          "competitions": [{ "competitors": [] }] },
        { "id": "3", "date": "2025-01-11T19:00Z",
          "status": { "period": 2, "type": { "name": "STATUS_FINAL" } },
          "competitions": [{ "competitors": [
              { "id": "30", "homeAway": "home", "score": "60" },
              { "id": "40", "homeAway": "away", "score": "58" } ] }] }
    ] }"#;

    const SUMMARY_ONE: &str = r#"{ "plays": [
        { "period": { "number": 2 }, "clock": { "displayValue": "6:00" },
          "homeScore": 66, "awayScore": 64 },
        { "period": { "number": 2 }, "clock": { "displayValue": "5:30" },
          "homeScore": 69, "awayScore": 64, "text": "Three" }
    ] }"#;

    const SUMMARY_THREE: &str = r#"{ "plays": [
        { "period": { "number": 2 }, "clock": { "displayValue": "0:00" },
          "homeScore": 60, "awayScore": 58 }
    ] }"#;

    type Harness = (mpsc::Sender<IngestRequest>, mpsc::Receiver<IngestResponse>, IngestWorker);

    fn worker_with(base_url: String, settings: &AppSettings) -> Harness {
        let (req_tx, req_rx) = mpsc::channel(4);
        let (resp_tx, resp_rx) = mpsc::channel(4);
        let client = NcaaApi::new(League::Mens).with_base_url(base_url);
        let worker = IngestWorker::with_client(client, settings, req_rx, resp_tx);
        (req_tx, resp_rx, worker)
    }

    fn worker(base_url: String) -> Harness {
        worker_with(base_url, &AppSettings::default())
    }

    #[tokio::test]
    async fn scans_started_games_for_a_date() {
        let mut server = mockito::Server::new_async().await;
        let _board = server
            .mock("GET", "/mens-college-basketball/scoreboard")
            .match_query(mockito::Matcher::Any)
            .with_body(SCOREBOARD)
            .create_async()
            .await;
        let _one = server
            .mock("GET", "/mens-college-basketball/summary")
            .match_query(mockito::Matcher::UrlEncoded("event".into(), "1".into()))
            .with_body(SUMMARY_ONE)
            .create_async()
            .await;
        let _three = server
            .mock("GET", "/mens-college-basketball/summary")
            .match_query(mockito::Matcher::UrlEncoded("event".into(), "3".into()))
            .with_body(SUMMARY_THREE)
            .create_async()
            .await;

        let (tx, mut rx, worker) = worker(server.url());
        let task = tokio::spawn(worker.run());

        let date = NaiveDate::from_ymd_opt(2025, 1, 11).unwrap();
        tx.send(IngestRequest::ScanDate { date }).await.unwrap();
        drop(tx);

        let Some(IngestResponse::DateScanned { records, failed, .. }) = rx.recv().await else {
            panic!("expected a scanned date");
        };
        task.await.unwrap();

        assert_eq!(failed, 0);
        let ids: Vec<&str> = records.iter().map(|r| r.game.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);

        let first = &records[0];
        let event = first.event.as_ref().unwrap();
        assert_eq!(event.team_id, "10");
        assert_eq!(event.margin, 5);
        assert_eq!(event.elapsed_seconds, 2070);
        assert_eq!(first.r69w, Some(true));

        assert!(records[1].event.is_none());
    }

    #[tokio::test]
    async fn failed_summaries_are_counted_not_fatal() {
        let mut server = mockito::Server::new_async().await;
        let _board = server
            .mock("GET", "/mens-college-basketball/scoreboard")
            .match_query(mockito::Matcher::Any)
            .with_body(SCOREBOARD)
            .create_async()
            .await;
        let _one = server
            .mock("GET", "/mens-college-basketball/summary")
            .match_query(mockito::Matcher::UrlEncoded("event".into(), "1".into()))
            .with_status(500)
            .create_async()
            .await;
        let _three = server
            .mock("GET", "/mens-college-basketball/summary")
            .match_query(mockito::Matcher::UrlEncoded("event".into(), "3".into()))
            .with_body(SUMMARY_THREE)
            .create_async()
            .await;

        let (tx, mut rx, worker) = worker(server.url());
        tokio::spawn(worker.run());

        let date = NaiveDate::from_ymd_opt(2025, 1, 11).unwrap();
        tx.send(IngestRequest::ScanDate { date }).await.unwrap();

        let Some(IngestResponse::DateScanned { records, failed, .. }) = rx.recv().await else {
            panic!("expected a scanned date");
        };
        assert_eq!(failed, 1);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].game.id, "3");
    }

    #[tokio::test]
    async fn archiving_keeps_play_rows_on_the_record() {
        let mut server = mockito::Server::new_async().await;
        let _summary = server
            .mock("GET", "/mens-college-basketball/summary")
            .match_query(mockito::Matcher::UrlEncoded("event".into(), "1".into()))
            .with_body(SUMMARY_ONE)
            .create_async()
            .await;

        let settings = AppSettings { plays_path: Some("plays.jsonl".into()), ..Default::default() };
        let (tx, mut rx, worker) = worker_with(server.url(), &settings);
        tokio::spawn(worker.run());

        tx.send(IngestRequest::ScanGame { game_id: "1".into() }).await.unwrap();
        let Some(IngestResponse::GameScanned { record }) = rx.recv().await else {
            panic!("expected a scanned game");
        };
        assert_eq!(record.plays.len(), 2);
        assert_eq!(record.plays[1].game_id, "1");
        assert_eq!(record.plays[1].clock_seconds, 330);
        assert_eq!(record.plays[1].elapsed_seconds, 2070);
    }

    #[tokio::test]
    async fn single_game_without_plays_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _summary = server
            .mock("GET", "/mens-college-basketball/summary")
            .match_query(mockito::Matcher::Any)
            .with_body(r#"{ "plays": [] }"#)
            .create_async()
            .await;

        let (tx, mut rx, worker) = worker(server.url());
        tokio::spawn(worker.run());

        tx.send(IngestRequest::ScanGame { game_id: "99".into() }).await.unwrap();
        let response = rx.recv().await;
        assert!(matches!(response, Some(IngestResponse::Error { .. })), "got {response:?}");
    }
}
