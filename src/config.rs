use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, SyncError};

/// How long to wait for the cookie consent button before giving up on it.
pub const CONSENT_WAIT: Duration = Duration::from_secs(3);

/// How long to wait for the "load more" control on the results page.
pub const LOAD_MORE_WAIT: Duration = Duration::from_secs(5);

/// How long to wait for the odds section of a match page.
pub const ODDS_WAIT: Duration = Duration::from_secs(3);

/// Pause after scrolling or expanding so lazily loaded rows can render.
pub const SETTLE_DELAY: Duration = Duration::from_secs(2);

pub const DEFAULT_BOOKMAKER: &str = "TippmixPro";
pub const DEFAULT_WALKOVER_MARKER: &str = "Továbbjutó";
pub const DEFAULT_TOURNAMENT_LABEL: &str = "PDC";

/// CSS selectors for the results site.
#[derive(Debug, Clone)]
pub struct Selectors {
    pub consent_button: String,
    pub row_link: String,
    pub load_more: String,
    pub participant: String,
    pub breadcrumb: String,
    pub prematch: String,
    pub odds_row: String,
    pub odds_cell: String,
    /// Class fragment marking the winning odds cell.
    pub won_class: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            consent_button: "#onetrust-accept-btn-handler".into(),
            row_link: "a.eventRowLink".into(),
            load_more: ".event__more".into(),
            participant: ".participant__participantNameWrapper".into(),
            breadcrumb: r#"[class*="breadcrumbItemLabel"]"#.into(),
            prematch: "a.prematchLink".into(),
            odds_row: r#"div[class*="oddsRow"]"#.into(),
            odds_cell: r#"button[class*="oddsCell"]"#.into(),
            won_class: "wcl-win".into(),
        }
    }
}

/// Runtime settings, read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub sources_file: PathBuf,
    pub log_level: String,
    pub tournament_label: String,
    pub bookmaker: String,
    pub walkover_marker: String,
    /// Non-walkover records with odds at or below this are skipped (MIN_ODDS). Unset: no filtering.
    pub min_odds: Option<f64>,
    pub request_timeout: Duration,
    /// Upper bound for waiting on required page elements (WAIT_TIMEOUT_SECS).
    pub wait_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let secs = |key: &str, default: u64| -> Result<Duration> {
            match var(key) {
                Some(v) => v
                    .trim()
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|_| SyncError::Config(format!("{key} must be a whole number of seconds"))),
                None => Ok(Duration::from_secs(default)),
            }
        };
        let min_odds = match var("MIN_ODDS").filter(|v| !v.trim().is_empty()) {
            Some(v) => Some(
                parse_decimal(&v)
                    .ok_or_else(|| SyncError::Config("MIN_ODDS must be a decimal number".into()))?,
            ),
            None => None,
        };

        Ok(Self {
            data_dir: var("DATA_DIR").unwrap_or_else(|| "data".into()).into(),
            sources_file: var("SOURCES_FILE")
                .unwrap_or_else(|| "sources.json".into())
                .into(),
            log_level: var("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            tournament_label: var("TOURNAMENT_LABEL")
                .unwrap_or_else(|| DEFAULT_TOURNAMENT_LABEL.into()),
            bookmaker: var("BOOKMAKER").unwrap_or_else(|| DEFAULT_BOOKMAKER.into()),
            walkover_marker: var("WALKOVER_MARKER")
                .unwrap_or_else(|| DEFAULT_WALKOVER_MARKER.into()),
            min_odds,
            request_timeout: secs("REQUEST_TIMEOUT_SECS", 30)?,
            wait_timeout: secs("WAIT_TIMEOUT_SECS", 10)?,
        })
    }
}

/// Parses a decimal written with either `.` or `,` as separator.
///
/// `NaN` and infinities are rejected.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    raw.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Results-page URL per tournament year.
#[derive(Debug, Clone, Default)]
pub struct SourceMap(BTreeMap<i32, String>);

impl SourceMap {
    /// Load a JSON object of `"year": "url"` pairs.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| SyncError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|source| SyncError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(text: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(text).map(Self)
    }

    pub fn from_pairs<I: IntoIterator<Item = (i32, String)>>(pairs: I) -> Self {
        Self(pairs.into_iter().collect())
    }

    pub fn years(&self) -> Vec<i32> {
        self.0.keys().copied().collect()
    }

    pub fn url(&self, year: i32) -> Result<&str> {
        self.0
            .get(&year)
            .map(String::as_str)
            .ok_or_else(|| SyncError::UnknownYear {
                year,
                available: self.years(),
            })
    }
}
