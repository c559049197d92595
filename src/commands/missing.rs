use anyhow::Result;
use std::path::PathBuf;

use crate::commands::CommandReport;
use crate::wordle::archive::SolutionArchive;
use crate::wordle::config::load_config;
use crate::wordle::gaps::{allowed_date, missing_dates};
use crate::wordle::paths::resolve_paths;
use crate::wordle::util::today_utc;

#[derive(Debug, Clone)]
pub struct MissingOptions {
    pub limit: usize,
    pub archive_file: Option<PathBuf>,
}

pub fn run(opts: &MissingOptions) -> Result<CommandReport> {
    let paths = resolve_paths()?.with_archive_file(opts.archive_file.clone());
    let cfg = load_config(&paths)?;
    let mut report = CommandReport::new("missing");

    let (archive, _load) = SolutionArchive::load(&paths.archive_file)?;
    let through = allowed_date(today_utc(), cfg.archive.publication_lag_days);
    let missing = missing_dates(&archive, cfg.archive.start_date, through);

    report.detail(format!("archive_file={}", paths.archive_file.display()));
    report.detail(format!("existing={}", archive.len()));
    report.detail(format!(
        "checked {} through {}",
        cfg.archive.start_date, through
    ));

    if missing.is_empty() {
        report.detail("no missing solutions");
        return Ok(report);
    }

    report.detail(format!("missing={}", missing.len()));
    for date in missing.iter().take(opts.limit) {
        report.detail(format!("missing {date}"));
    }
    if missing.len() > opts.limit {
        report.detail(format!("... and {} more", missing.len() - opts.limit));
    }
    Ok(report)
}
