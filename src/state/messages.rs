use crate::record::GameRecord;
use chrono::NaiveDate;

#[derive(Debug, Clone)]
pub enum IngestRequest {
    ScanGame { game_id: String },
    ScanDate { date: NaiveDate },
}

#[derive(Debug)]
pub enum IngestResponse {
    GameScanned { record: GameRecord },
    /// Every started game on `date`; `failed` counts summaries that could not be fetched.
    DateScanned { date: NaiveDate, records: Vec<GameRecord>, failed: usize },
    Error { message: String },
}
