use anyhow::Result;
use std::path::PathBuf;

use crate::commands::{CommandReport, describe_load};
use crate::wordle::archive::{ArchiveLock, UpsertOutcome};
use crate::wordle::audit;
use crate::wordle::config::load_config;
use crate::wordle::fetcher::{FetchedSolution, HttpSolutionSource};
use crate::wordle::paths::{WordlePaths, resolve_paths};
use crate::wordle::reconcile::{
    BackfillOptions, BackfillOutcome, SingleDateOutcome, SingleDateStatus, run_backfill,
    run_single,
};
use crate::wordle::util::{parse_date, today_utc};

/// Dates listed individually in a report before collapsing into a count.
const LISTED_DATES: usize = 20;

#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub date: Option<String>,
    pub force: bool,
    pub max_fetches: Option<usize>,
    pub dry_run: bool,
    pub archive_file: Option<PathBuf>,
}

fn report_backfill(report: &mut CommandReport, out: &BackfillOutcome, dry_run: bool) {
    describe_load(report, &out.load);
    report.detail(format!(
        "checked {} through {}",
        out.plan.from, out.plan.through
    ));
    report.detail(format!("missing={}", out.plan.missing.len()));

    for solution in &out.fetched {
        report.detail(format!("fetched {}", describe_solution(solution)));
    }
    report.detail(format!("fetched={}", out.fetched.len()));

    if !out.deferred.is_empty() {
        let verb = if dry_run { "would fetch" } else { "deferred" };
        for date in out.deferred.iter().take(LISTED_DATES) {
            report.detail(format!("{verb} {date}"));
        }
        if out.deferred.len() > LISTED_DATES {
            report.detail(format!(
                "... and {} more",
                out.deferred.len() - LISTED_DATES
            ));
        }
    }
    if out.plan.missing.is_empty() {
        report.detail("nothing to do; archive is up to date");
    }
    report.detail(format!("total={}", out.total));
}

fn describe_solution(solution: &FetchedSolution) -> String {
    let mut tags = Vec::new();
    if let Some(number) = solution.puzzle_number {
        tags.push(format!("#{number}"));
    }
    if let Some(editor) = &solution.editor {
        tags.push(format!("ed. {editor}"));
    }
    if tags.is_empty() {
        solution.record.to_line()
    } else {
        format!("{} ({})", solution.record.to_line(), tags.join(", "))
    }
}

fn report_single(report: &mut CommandReport, out: &SingleDateOutcome) {
    describe_load(report, &out.load);
    let line = format!("{} {}", out.date, out.word);
    if let Some(solution) = &out.fetched {
        report.detail(format!("fetched {}", describe_solution(solution)));
    }
    match out.status {
        SingleDateStatus::AlreadyPresent => report.detail(format!("already present: {line}")),
        SingleDateStatus::Stored(UpsertOutcome::Inserted) => {
            report.detail(format!("inserted {line}"))
        }
        SingleDateStatus::Stored(UpsertOutcome::Updated) => {
            report.detail(format!("updated {line}"))
        }
        SingleDateStatus::Stored(UpsertOutcome::Unchanged) => {
            report.detail(format!("unchanged {line}"))
        }
    }
    report.detail(format!("total={}", out.total));
}

fn audit_outcome(paths: &WordlePaths, result: &Result<String>) -> Result<()> {
    match result {
        Ok(message) => audit::append_event(paths, "fetch", "ok", message),
        Err(err) => audit::append_event(paths, "fetch", "failed", &format!("{err:#}")),
    }
}

pub fn run(opts: &FetchOptions) -> Result<CommandReport> {
    // A bad date is an input error; fail before touching anything.
    let date = opts.date.as_deref().map(parse_date).transpose()?;

    let paths = resolve_paths()?.with_archive_file(opts.archive_file.clone());
    let cfg = load_config(&paths)?;
    let mut report = CommandReport::new("fetch");
    report.detail(format!("archive_file={}", paths.archive_file.display()));

    let _lock = if opts.dry_run {
        None
    } else {
        Some(ArchiveLock::acquire(&paths)?)
    };
    let source = HttpSolutionSource::new(&cfg.api)?;

    let result = match date {
        Some(date) => run_single(&paths.archive_file, &source, date, opts.force).map(|out| {
            report_single(&mut report, &out);
            format!("{} {} saved={}", out.date, out.word, out.saved)
        }),
        None => run_backfill(
            &paths.archive_file,
            &source,
            &cfg.archive,
            today_utc(),
            BackfillOptions {
                max_fetches: opts.max_fetches,
                dry_run: opts.dry_run,
            },
        )
        .map(|out| {
            report_backfill(&mut report, &out, opts.dry_run);
            format!(
                "missing={} fetched={} saved={}",
                out.plan.missing.len(),
                out.fetched.len(),
                out.saved
            )
        }),
    };

    if !opts.dry_run {
        if let Err(audit_err) = audit_outcome(&paths, &result) {
            report.detail(format!("audit log not written: {audit_err:#}"));
        }
    }
    result?;
    Ok(report)
}
