use crate::wordle::archive::{LoadReport, SolutionArchive, UpsertOutcome};
use crate::wordle::config::WordleArchiveConfig;
use crate::wordle::fetcher::{FetchedSolution, SolutionSource};
use crate::wordle::gaps::{allowed_date, expected_start, missing_dates};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackfillPlan {
    pub from: NaiveDate,
    pub through: NaiveDate,
    pub missing: Vec<NaiveDate>,
}

pub fn plan_backfill(
    archive: &SolutionArchive,
    cfg: &WordleArchiveConfig,
    today: NaiveDate,
) -> BackfillPlan {
    let through = allowed_date(today, cfg.publication_lag_days);
    let from = expected_start(archive, cfg.start_date, cfg.gap_scan);
    BackfillPlan {
        from,
        through,
        missing: missing_dates(archive, from, through),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BackfillOptions {
    pub max_fetches: Option<usize>,
    pub dry_run: bool,
}

#[derive(Debug, Clone)]
pub struct BackfillOutcome {
    pub plan: BackfillPlan,
    pub load: LoadReport,
    pub fetched: Vec<FetchedSolution>,
    pub deferred: Vec<NaiveDate>,
    pub total: usize,
    pub saved: bool,
}

fn save_if(archive: &SolutionArchive, path: &Path, changed: bool) -> Result<bool> {
    if !changed {
        return Ok(false);
    }
    archive.save(path)?;
    Ok(true)
}

/// Fetch every missing date through the allowed date and save once at the end.
///
/// A failed fetch aborts before anything is written.
pub fn run_backfill<S: SolutionSource>(
    archive_file: &Path,
    source: &S,
    cfg: &WordleArchiveConfig,
    today: NaiveDate,
    opts: BackfillOptions,
) -> Result<BackfillOutcome> {
    let (mut archive, load) = SolutionArchive::load(archive_file)?;
    let plan = plan_backfill(&archive, cfg, today);

    let take = opts
        .max_fetches
        .unwrap_or(plan.missing.len())
        .min(plan.missing.len());
    let (due, rest) = plan.missing.split_at(take);
    let deferred = rest.to_vec();

    if opts.dry_run {
        return Ok(BackfillOutcome {
            total: archive.len(),
            deferred: plan.missing.clone(),
            plan,
            load,
            fetched: Vec::new(),
            saved: false,
        });
    }

    let mut fetched = Vec::with_capacity(due.len());
    for date in due {
        let solution = source
            .fetch(*date)
            .with_context(|| format!("failed to fetch solution for {date}"))?;
        archive.upsert(solution.record.clone());
        fetched.push(solution);
    }

    let saved = save_if(
        &archive,
        archive_file,
        !fetched.is_empty() || load.needs_rewrite(),
    )?;

    Ok(BackfillOutcome {
        plan,
        load,
        fetched,
        deferred,
        total: archive.len(),
        saved,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SingleDateStatus {
    AlreadyPresent,
    Stored(UpsertOutcome),
}

#[derive(Debug, Clone)]
pub struct SingleDateOutcome {
    pub date: NaiveDate,
    pub word: String,
    pub status: SingleDateStatus,
    pub fetched: Option<FetchedSolution>,
    pub load: LoadReport,
    pub total: usize,
    pub saved: bool,
}

/// Fetch one explicit date and upsert it. A date already stored is left
/// alone unless `force` is set.
pub fn run_single<S: SolutionSource>(
    archive_file: &Path,
    source: &S,
    date: NaiveDate,
    force: bool,
) -> Result<SingleDateOutcome> {
    let (mut archive, load) = SolutionArchive::load(archive_file)?;

    if !force {
        if let Some(word) = archive.get(date).map(str::to_string) {
            let saved = save_if(&archive, archive_file, load.needs_rewrite())?;
            return Ok(SingleDateOutcome {
                date,
                word,
                status: SingleDateStatus::AlreadyPresent,
                fetched: None,
                total: archive.len(),
                load,
                saved,
            });
        }
    }

    let solution = source
        .fetch(date)
        .with_context(|| format!("failed to fetch solution for {date}"))?;
    let upsert = archive.upsert(solution.record.clone());
    let changed = upsert != UpsertOutcome::Unchanged || load.needs_rewrite();
    let saved = save_if(&archive, archive_file, changed)?;

    Ok(SingleDateOutcome {
        date,
        word: solution.record.word.clone(),
        status: SingleDateStatus::Stored(upsert),
        fetched: Some(solution),
        total: archive.len(),
        load,
        saved,
    })
}
