use crate::cli::Args;
use ncaa_api::League;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration, resolved once from flags and `R69W_*` env vars.
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub league: League,
    pub threshold: u16,
    pub concurrency: usize,
    pub json: bool,
    pub log_filter: String,
    pub request_timeout: Duration,
    /// Where archived play rows go, when asked for.
    pub plays_path: Option<PathBuf>,
}

impl AppSettings {
    pub fn from_args(args: &Args) -> Self {
        Self {
            league: args.league,
            threshold: args.threshold,
            concurrency: usize::from(args.concurrency.max(1)),
            json: args.json,
            log_filter: args.log_level.clone(),
            request_timeout: Duration::from_secs(args.timeout.max(1)),
            plays_path: args.plays.clone(),
        }
    }

    /// Install the global logger. `RUST_LOG` wins over `--log-level` when set.
    pub fn archive_plays(&self) -> bool {
        self.plays_path.is_some()
    }

    pub fn init_logging(&self) {
        let env = env_logger::Env::default().default_filter_or(self.log_filter.as_str());
        let _ = env_logger::Builder::from_env(env)
            .format_timestamp_secs()
            .target(env_logger::Target::Stderr)
            .try_init();
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            league: League::default(),
            threshold: ncaa_api::r69::DEFAULT_THRESHOLD,
            concurrency: 4,
            json: false,
            log_filter: "warn".into(),
            request_timeout: Duration::from_secs(10),
            plays_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn settings_follow_flags() {
        let args = Args::try_parse_from(["r69w", "-c", "8", "-t", "72", "game", "401"]).unwrap();
        let settings = AppSettings::from_args(&args);
        assert_eq!(settings.concurrency, 8);
        assert_eq!(settings.threshold, 72);
        assert!(!settings.json);
        assert_eq!(settings.request_timeout, Duration::from_secs(10));
        assert!(!settings.archive_plays());
    }

    #[test]
    fn plays_flag_turns_on_archiving() {
        let args = Args::try_parse_from(["r69w", "--plays", "out.jsonl", "date"]).unwrap();
        let settings = AppSettings::from_args(&args);
        assert!(settings.archive_plays());
        assert_eq!(settings.plays_path, Some(PathBuf::from("out.jsonl")));
    }
}
