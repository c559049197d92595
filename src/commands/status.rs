use anyhow::Result;
use std::env;
use std::path::PathBuf;

use crate::commands::CommandReport;
use crate::error::WarnCode;
use crate::wordle::archive::SolutionArchive;
use crate::wordle::config::load_config;
use crate::wordle::paths::resolve_paths;
use crate::wordle::warn::{self, WarnEvent};

mod generated {
    include!(concat!(env!("OUT_DIR"), "/wordle_env_allowlist.rs"));
}

const ENV_PREFIX: &str = "WORDLE_";

fn unknown_env_keys<'a>(set_keys: impl Iterator<Item = &'a str>, allowlist: &[&str]) -> Vec<String> {
    let mut out: Vec<String> = set_keys
        .filter(|key| key.starts_with(ENV_PREFIX))
        .filter(|key| !allowlist.iter().any(|allowed| allowed == key))
        .map(ToOwned::to_owned)
        .collect();
    out.sort();
    out
}

pub fn run(archive_file: Option<PathBuf>) -> Result<CommandReport> {
    let paths = resolve_paths()?.with_archive_file(archive_file);
    let mut report = CommandReport::new("status");

    report.detail(format!("wordle_home={}", paths.wordle_home.display()));
    report.detail(format!("archive_file={}", paths.archive_file.display()));
    report.detail(format!("logs_dir={}", paths.logs_dir.display()));
    report.detail(format!(
        "config_file={}{}",
        paths.config_file.display(),
        if paths.config_file.exists() { "" } else { " (absent)" }
    ));

    match load_config(&paths) {
        Ok(cfg) => {
            report.detail(format!("api_base_url={}", cfg.api.base_url));
            report.detail(format!(
                "request_timeout_secs={}",
                cfg.api.request_timeout_secs
            ));
            report.detail(format!("start_date={}", cfg.archive.start_date));
            report.detail(format!(
                "publication_lag_days={}",
                cfg.archive.publication_lag_days
            ));
            report.detail(format!("gap_scan={}", cfg.archive.gap_scan));
        }
        Err(err) => report.issue(format!("config invalid: {err:#}")),
    }

    if paths.archive_file.exists() {
        let (archive, load) = SolutionArchive::load(&paths.archive_file)?;
        report.detail(format!("archive_records={}", archive.len()));
        if archive.is_empty() {
            report.detail("archive_range=none");
        } else if let (Some(first), Some(last)) = (archive.first_date(), archive.last_date()) {
            report.detail(format!("archive_range={first}..={last}"));
        }
        if !load.is_clean() {
            report.issue("archive needs repair; run `wordle repair`");
        }
    } else {
        report.detail("archive_records=0 (file absent)");
    }

    let set_keys: Vec<String> = env::vars()
        .map(|(key, _)| key)
        .filter(|key| key.starts_with(ENV_PREFIX))
        .collect();
    for key in &set_keys {
        if generated::GENERATED_WORDLE_ENV_ALLOWLIST
            .iter()
            .any(|allowed| *allowed == key.as_str())
        {
            report.detail(format!("env {key} is set"));
        }
    }
    let unknown = unknown_env_keys(
        set_keys.iter().map(String::as_str),
        generated::GENERATED_WORDLE_ENV_ALLOWLIST,
    );
    for key in unknown {
        warn::emit(WarnEvent {
            code: WarnCode::W004UnknownEnv,
            stage: "status",
            action: "ignore",
            date: "",
            reason: &key,
            err: "not a recognised variable",
        });
        report.issue(format!("unrecognised env var {key}"));
    }

    Ok(report)
}
