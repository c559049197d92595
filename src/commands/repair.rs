use anyhow::Result;
use std::path::PathBuf;

use crate::commands::{CommandReport, describe_load};
use crate::wordle::archive::{ArchiveLock, SolutionArchive};
use crate::wordle::audit;
use crate::wordle::paths::resolve_paths;

pub fn run(archive_file: Option<PathBuf>) -> Result<CommandReport> {
    let paths = resolve_paths()?.with_archive_file(archive_file);
    let mut report = CommandReport::new("repair");
    report.detail(format!("archive_file={}", paths.archive_file.display()));

    if !paths.archive_file.exists() {
        report.detail("archive file does not exist; nothing to repair");
        return Ok(report);
    }

    let _lock = ArchiveLock::acquire(&paths)?;
    let (archive, load) = SolutionArchive::load(&paths.archive_file)?;

    // Removed between the existence check and the lock.
    if !load.existed {
        report.detail("archive file does not exist; nothing to repair");
        return Ok(report);
    }
    if load.is_clean() {
        report.detail(format!("archive already clean ({} records)", archive.len()));
        return Ok(report);
    }

    describe_load(&mut report, &load);
    archive.save(&paths.archive_file)?;
    report.detail(format!("rewrote {} records", archive.len()));
    audit::append_event(
        &paths,
        "repair",
        "ok",
        &format!(
            "records={} skipped={} duplicates={} resorted={} normalized={}",
            archive.len(),
            load.skipped_lines.len(),
            load.duplicate_dates.len(),
            !load.sorted,
            !load.canonical
        ),
    )?;

    Ok(report)
}
