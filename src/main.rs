mod app;
mod archive;
mod cli;
mod record;
mod report;
mod state;
mod stats;

use crate::app::{App, RunMode};
use crate::cli::{Args, Command};
use crate::state::app_settings::AppSettings;
use crate::state::messages::{IngestRequest, IngestResponse};
use crate::state::network::IngestWorker;
use crate::state::refresher::PeriodicRefresher;
use anyhow::{Context, bail};
use chrono::{Local, NaiveDate};
use clap::Parser;
use log::{info, warn};
use ncaa_api::season::Season;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    better_panic::install();

    let args = Args::parse();
    let settings = AppSettings::from_args(&args);
    settings.init_logging();

    let today = Local::now().date_naive();
    let mode = match args.command {
        Command::Watch { .. } => RunMode::Watch,
        _ => RunMode::Batch,
    };
    // Resolve the work up front so a bad season label fails before any fetch.
    let planned = plan_requests(&args.command, today)?;
    info!(
        "{} league, threshold {}, {} requests planned",
        settings.league.label(),
        settings.threshold,
        planned.len()
    );

    let archive = settings.plays_path.as_deref().map(open_archive).transpose()?;

    let (ingest_req_tx, ingest_req_rx) = mpsc::channel::<IngestRequest>(100);
    let (ingest_resp_tx, ingest_resp_rx) = mpsc::channel::<IngestResponse>(100);

    // Ingest thread
    let worker = IngestWorker::new(&settings, ingest_req_rx, ingest_resp_tx);
    let worker_task = tokio::spawn(worker.run());

    // Request feeder: a fixed batch, or the periodic refresher in watch mode.
    let feeder_task = match args.command {
        Command::Watch { interval } => {
            let refresher = PeriodicRefresher::new(ingest_req_tx, Duration::from_secs(interval));
            tokio::spawn(refresher.run())
        }
        _ => tokio::spawn(feed_requests(planned, ingest_req_tx)),
    };

    let mut app = App::new(settings, mode).with_archive(archive);
    let mut stdout = io::stdout().lock();
    main_loop(&mut app, ingest_resp_rx, &mut stdout).await?;

    feeder_task.abort();
    worker_task.abort();

    app.finish(&mut stdout)?;

    if mode == RunMode::Batch && app.records.is_empty() && (app.errors > 0 || app.failed > 0) {
        bail!(
            "nothing could be scanned ({} errors, {} failed fetches)",
            app.errors,
            app.failed
        );
    }
    Ok(())
}

fn open_archive(path: &Path) -> anyhow::Result<Box<dyn Write>> {
    let file = File::create(path)
        .with_context(|| format!("cannot create play archive {}", path.display()))?;
    info!("archiving plays to {}", path.display());
    Ok(Box::new(BufWriter::new(file)))
}

/// Turn a batch command into the requests the ingest worker should run.
fn plan_requests(command: &Command, today: NaiveDate) -> anyhow::Result<Vec<IngestRequest>> {
    let date_requests = |seasons: Vec<Season>| -> Vec<IngestRequest> {
        seasons
            .iter()
            .flat_map(|s| s.dates())
            .map(|date| IngestRequest::ScanDate { date })
            .collect()
    };

    let requests = match command {
        Command::Game { game_id } => {
            vec![IngestRequest::ScanGame { game_id: game_id.clone() }]
        }
        Command::Date { date } => {
            vec![IngestRequest::ScanDate { date: date.unwrap_or(today) }]
        }
        Command::Season { label } => {
            let season = Season::parse(label, today).with_context(|| {
                format!("'{label}' is not a started season (expected e.g. 2023-24)")
            })?;
            date_requests(vec![season])
        }
        Command::Seasons { count } => {
            let seasons = Season::recent(usize::from(*count), today);
            if seasons.is_empty() {
                bail!("no season has started yet");
            }
            date_requests(seasons)
        }
        Command::Watch { .. } => Vec::new(),
    };
    Ok(requests)
}

async fn feed_requests(
    requests: Vec<IngestRequest>,
    ingest_requests: mpsc::Sender<IngestRequest>,
) {
    for request in requests {
        if ingest_requests.send(request).await.is_err() {
            break;
        }
    }
    // Dropping the sender lets the worker drain and exit.
}

async fn main_loop(
    app: &mut App,
    mut ingest_responses: mpsc::Receiver<IngestResponse>,
    out: &mut impl io::Write,
) -> anyhow::Result<()> {
    loop {
        tokio::select! {
            response = ingest_responses.recv() => {
                let Some(response) = response else {
                    break;
                };
                app.on_response(response, out)?;
                out.flush()?;
            }

            _ = tokio::signal::ctrl_c() => {
                warn!("interrupted, summarizing what was scanned so far");
                break;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn date_defaults_to_today() {
        let today = ymd(2025, 3, 20);
        let requests = plan_requests(&Command::Date { date: None }, today).unwrap();
        assert!(
            matches!(requests.as_slice(), [IngestRequest::ScanDate { date }] if *date == today)
        );
    }

    #[test]
    fn season_expands_to_every_day() {
        let requests =
            plan_requests(&Command::Season { label: "2023-24".into() }, ymd(2026, 10, 19)).unwrap();
        // Nov 1 2023 .. Apr 10 2024, leap year.
        assert_eq!(requests.len(), 30 + 31 + 31 + 29 + 31 + 10);
    }

    #[test]
    fn bad_season_label_fails_early() {
        let today = ymd(2026, 1, 1);
        assert!(plan_requests(&Command::Season { label: "2023-25".into() }, today).is_err());
    }

    #[test]
    fn overflowing_season_label_is_an_error_not_a_panic() {
        let command = Command::Season { label: "2147483647-48".into() };
        let err = plan_requests(&command, ymd(2026, 1, 1)).unwrap_err();
        assert!(err.to_string().contains("2147483647-48"), "{err}");
    }

    #[test]
    fn archive_in_a_missing_directory_fails_up_front() {
        let path = std::env::temp_dir().join("r69w-no-such-dir").join("plays.jsonl");
        assert!(open_archive(&path).is_err());
    }

    #[test]
    fn watch_plans_nothing_up_front() {
        let requests = plan_requests(&Command::Watch { interval: 30 }, ymd(2026, 1, 1)).unwrap();
        assert!(requests.is_empty());
    }
}
