use crate::archive;
use crate::record::GameRecord;
use crate::report;
use crate::state::app_settings::AppSettings;
use crate::state::messages::IngestResponse;
use crate::stats::RaceStats;
use chrono::NaiveDate;
use log::{debug, error, info};
use std::collections::HashSet;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Report every scanned game, summarize at the end.
    Batch,
    /// Report a game only the first time its race is seen.
    Watch,
}

pub struct App {
    pub settings: AppSettings,
    pub mode: RunMode,
    pub records: Vec<GameRecord>,
    pub failed: usize,
    pub errors: usize,
    pub archived_plays: usize,
    archive: Option<Box<dyn Write>>,
    /// Watch mode: games already reported / archived on `watch_date`.
    reported: HashSet<String>,
    archived: HashSet<String>,
    watch_date: Option<NaiveDate>,
}

impl App {
    pub fn new(settings: AppSettings, mode: RunMode) -> Self {
        Self {
            settings,
            mode,
            records: Vec::new(),
            failed: 0,
            errors: 0,
            archived_plays: 0,
            archive: None,
            reported: HashSet::new(),
            archived: HashSet::new(),
            watch_date: None,
        }
    }

    /// Send archived play rows to `archive` as they arrive.
    pub fn with_archive(mut self, archive: Option<Box<dyn Write>>) -> Self {
        self.archive = archive;
        self
    }

    // -----------------------------------------------------------------------
    // Ingest response handlers — called from the main loop
    // -----------------------------------------------------------------------

    pub fn on_response(
        &mut self,
        response: IngestResponse,
        out: &mut impl Write,
    ) -> io::Result<()> {
        match response {
            IngestResponse::GameScanned { record } => self.on_record(record, out),
            IngestResponse::DateScanned { date, records, failed } => {
                info!("{date}: {} games scanned, {failed} failed", records.len());
                self.failed += failed;
                if self.mode == RunMode::Watch {
                    self.roll_over(date);
                }
                for record in records {
                    self.on_record(record, out)?;
                }
                Ok(())
            }
            IngestResponse::Error { message } => {
                error!("{message}");
                self.errors += 1;
                Ok(())
            }
        }
    }

    fn on_record(&mut self, mut record: GameRecord, out: &mut impl Write) -> io::Result<()> {
        match self.mode {
            RunMode::Batch => {
                report::write_record(out, &record, self.settings.json)?;
                self.archive_plays(&mut record)?;
                self.records.push(record);
            }
            RunMode::Watch => {
                // The race is single-shot per game; live rescans must not repeat it.
                if record.event.is_some() && self.reported.insert(record.game.id.clone()) {
                    report::write_record(out, &record, self.settings.json)?;
                }
                // Play-by-play is only complete once the game is over.
                if record.game.is_final() && self.archived.insert(record.game.id.clone()) {
                    self.archive_plays(&mut record)?;
                }
            }
        }
        Ok(())
    }

    fn archive_plays(&mut self, record: &mut GameRecord) -> io::Result<()> {
        let rows = std::mem::take(&mut record.plays);
        if let Some(sink) = self.archive.as_mut() {
            archive::write_rows(sink, &rows)?;
            self.archived_plays += rows.len();
        }
        Ok(())
    }

    /// A new scoreboard day has nothing in common with the last one.
    fn roll_over(&mut self, date: NaiveDate) {
        if self.watch_date.is_some_and(|current| current != date) {
            debug!("watching {date}, forgetting {} reported games", self.reported.len());
            self.reported.clear();
            self.archived.clear();
        }
        self.watch_date = Some(date);
    }

    pub fn stats(&self) -> RaceStats {
        self.records.iter().collect()
    }

    /// Summary for multi-game runs.
    pub fn finish(&mut self, out: &mut impl Write) -> io::Result<()> {
        if self.records.len() > 1 || self.failed > 0 {
            report::write_summary(out, &self.stats(), self.failed, self.settings.json)?;
        }
        if let Some(archive) = self.archive.as_mut() {
            archive.flush()?;
            info!("archived {} plays", self.archived_plays);
        }
        out.flush()
    }
}
