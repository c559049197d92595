use crate::error::WordleError;
use crate::wordle::paths::WordlePaths;
use crate::wordle::util::parse_date;
use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::Path;

pub const DEFAULT_API_BASE_URL: &str = "https://www.nytimes.com/svc/wordle/v2";

/// Date of the first published puzzle.
pub fn first_puzzle_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 6, 19).unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GapScan {
    /// Only dates after the newest stored record.
    Tail,
    /// Every date from the configured start date.
    Full,
}

impl GapScan {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "tail" | "TAIL" => Some(Self::Tail),
            "full" | "FULL" => Some(Self::Full),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tail => "tail",
            Self::Full => "full",
        }
    }
}

impl fmt::Display for GapScan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WordleApiConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for WordleApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WordleArchiveConfig {
    pub start_date: NaiveDate,
    pub publication_lag_days: u32,
    pub gap_scan: GapScan,
}

impl Default for WordleArchiveConfig {
    fn default() -> Self {
        Self {
            start_date: first_puzzle_date(),
            publication_lag_days: 2,
            gap_scan: GapScan::Tail,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WordleConfig {
    pub api: WordleApiConfig,
    pub archive: WordleArchiveConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialWordleConfig {
    api: Option<WordleApiConfig>,
    archive: Option<WordleArchiveConfig>,
}

fn env_or_u64(var: &str, fallback: u64) -> u64 {
    match env::var(var) {
        Ok(v) => v.trim().parse::<u64>().ok().unwrap_or(fallback),
        Err(_) => fallback,
    }
}

fn env_or_u32(var: &str, fallback: u32) -> u32 {
    match env::var(var) {
        Ok(v) => v.trim().parse::<u32>().ok().unwrap_or(fallback),
        Err(_) => fallback,
    }
}

fn env_or_string(var: &str, fallback: &str) -> String {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => fallback.to_string(),
    }
}

fn env_or_date(var: &str, fallback: NaiveDate) -> Result<NaiveDate> {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => parse_date(&v).map_err(|err| anyhow!("{var}: {err}")),
        _ => Ok(fallback),
    }
}

fn env_or_gap_scan(var: &str, fallback: GapScan) -> Result<GapScan> {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => GapScan::parse(&v)
            .ok_or_else(|| anyhow!("invalid gap scan mode in {var}: use `tail` or `full`")),
        _ => Ok(fallback),
    }
}

fn validate(cfg: &WordleConfig) -> Result<()> {
    let base = cfg.api.base_url.trim();
    if base.is_empty() {
        return Err(anyhow!("invalid api base url: cannot be empty"));
    }
    if !base.starts_with("http://") && !base.starts_with("https://") {
        return Err(anyhow!(
            "invalid api base url `{base}`: must start with http:// or https://"
        ));
    }
    if cfg.api.request_timeout_secs == 0 {
        return Err(anyhow!(
            "invalid request timeout: must be >= 1 second"
        ));
    }
    Ok(())
}

fn merge_toml(base: &mut WordleConfig, raw: &str, origin: &Path) -> Result<()> {
    let parsed: PartialWordleConfig = toml::from_str(raw).map_err(|err| {
        WordleError::InvalidConfig(format!("failed to parse {}: {err}", origin.display()))
    })?;
    if let Some(api) = parsed.api {
        base.api = api;
    }
    if let Some(archive) = parsed.archive {
        base.archive = archive;
    }
    Ok(())
}

fn merge_file_config(base: &mut WordleConfig, path: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }

    let raw = fs::read_to_string(path).map_err(|err| {
        WordleError::InvalidConfig(format!("failed to read {}: {err}", path.display()))
    })?;
    merge_toml(base, &raw, path)
}

pub fn load_config(paths: &WordlePaths) -> Result<WordleConfig> {
    let mut cfg = WordleConfig::default();
    merge_file_config(&mut cfg, &paths.config_file)?;

    cfg.api.base_url = env_or_string("WORDLE_API_BASE_URL", &cfg.api.base_url);
    cfg.api.request_timeout_secs =
        env_or_u64("WORDLE_REQUEST_TIMEOUT_SECS", cfg.api.request_timeout_secs);
    cfg.archive.publication_lag_days = env_or_u32(
        "WORDLE_PUBLICATION_LAG_DAYS",
        cfg.archive.publication_lag_days,
    );
    cfg.archive.start_date = env_or_date("WORDLE_START_DATE", cfg.archive.start_date)?;
    cfg.archive.gap_scan = env_or_gap_scan("WORDLE_GAP_SCAN", cfg.archive.gap_scan)?;

    validate(&cfg)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn origin() -> PathBuf {
        PathBuf::from("wordle.toml")
    }

    #[test]
    fn defaults_point_at_public_endpoint() {
        let cfg = WordleConfig::default();
        assert_eq!(cfg.api.base_url, DEFAULT_API_BASE_URL);
        assert_eq!(cfg.api.request_timeout_secs, 5);
        assert_eq!(cfg.archive.publication_lag_days, 2);
        assert_eq!(cfg.archive.gap_scan, GapScan::Tail);
        assert_eq!(cfg.archive.start_date.to_string(), "2021-06-19");
        validate(&cfg).expect("defaults are valid");
    }

    #[test]
    fn file_sections_replace_defaults() {
        let mut cfg = WordleConfig::default();
        let raw = r#"
[api]
base_url = "http://127.0.0.1:9000/v2"

[archive]
start_date = "2024-01-01"
publication_lag_days = 1
gap_scan = "full"
"#;
        merge_toml(&mut cfg, raw, &origin()).expect("merge");
        assert_eq!(cfg.api.base_url, "http://127.0.0.1:9000/v2");
        assert_eq!(cfg.api.request_timeout_secs, 5);
        assert_eq!(cfg.archive.start_date.to_string(), "2024-01-01");
        assert_eq!(cfg.archive.publication_lag_days, 1);
        assert_eq!(cfg.archive.gap_scan, GapScan::Full);
    }

    #[test]
    fn missing_sections_keep_defaults() {
        let mut cfg = WordleConfig::default();
        merge_toml(&mut cfg, "", &origin()).expect("merge");
        assert_eq!(cfg.api.base_url, DEFAULT_API_BASE_URL);
        assert_eq!(cfg.archive.gap_scan, GapScan::Tail);
    }

    #[test]
    fn unparsable_file_is_reported_with_path() {
        let mut cfg = WordleConfig::default();
        let err = merge_toml(&mut cfg, "[archive]\ngap_scan = \"sideways\"", &origin())
            .expect_err("bad gap scan");
        assert!(err.to_string().contains("wordle.toml"));
    }

    #[test]
    fn validate_rejects_non_http_base_url() {
        let mut cfg = WordleConfig::default();
        cfg.api.base_url = "ftp://example.com".to_string();
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let mut cfg = WordleConfig::default();
        cfg.api.request_timeout_secs = 0;
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn gap_scan_parses_known_modes() {
        assert_eq!(GapScan::parse("tail"), Some(GapScan::Tail));
        assert_eq!(GapScan::parse(" full "), Some(GapScan::Full));
        assert_eq!(GapScan::parse("both"), None);
    }
}
