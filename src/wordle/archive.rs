use crate::error::{WarnCode, WordleError};
use crate::wordle::paths::WordlePaths;
use crate::wordle::util::{DATE_FORMAT, parse_date};
use crate::wordle::warn::{self, WarnEvent};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use fs2::FileExt;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionRecord {
    pub date: NaiveDate,
    pub word: String,
}

impl SolutionRecord {
    pub fn new(date: NaiveDate, word: &str) -> Self {
        Self {
            date,
            word: word.trim().to_ascii_uppercase(),
        }
    }

    pub fn to_line(&self) -> String {
        format!("{} {}", self.date.format(DATE_FORMAT), self.word)
    }

    pub fn parse_line(line: &str) -> Result<Self, String> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let [date, word] = parts.as_slice() else {
            return Err(format!("expected 2 fields, found {}", parts.len()));
        };
        let date = parse_date(date).map_err(|err| err.to_string())?;
        if !is_valid_word(word) {
            return Err(format!("word `{word}` is not alphabetic"));
        }
        Ok(Self::new(date, word))
    }
}

pub fn is_valid_word(word: &str) -> bool {
    !word.is_empty() && word.chars().all(|c| c.is_ascii_alphabetic())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
    Unchanged,
}

/// What loading found wrong with the file, if anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub existed: bool,
    pub sorted: bool,
    /// The file bytes already equal `render()` of the parsed records.
    pub canonical: bool,
    pub skipped_lines: Vec<usize>,
    pub duplicate_dates: Vec<NaiveDate>,
}

impl LoadReport {
    /// The in-memory archive differs from the file in order, content or layout.
    pub fn needs_rewrite(&self) -> bool {
        !self.sorted || !self.canonical || !self.duplicate_dates.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        !self.needs_rewrite() && self.skipped_lines.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolutionArchive {
    records: BTreeMap<NaiveDate, String>,
}

impl SolutionArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(raw: &str) -> (Self, LoadReport) {
        let mut archive = Self::new();
        let mut report = LoadReport {
            existed: true,
            sorted: true,
            canonical: true,
            ..LoadReport::default()
        };
        let mut last_seen: Option<NaiveDate> = None;

        for (idx, line) in raw.lines().enumerate() {
            let line_no = idx + 1;
            if line.trim().is_empty() {
                continue;
            }
            let record = match SolutionRecord::parse_line(line) {
                Ok(record) => record,
                Err(reason) => {
                    warn::emit(WarnEvent {
                        code: WarnCode::W001MalformedLine,
                        stage: "load",
                        action: "skip",
                        date: "",
                        reason: &format!("line {line_no}"),
                        err: &reason,
                    });
                    report.skipped_lines.push(line_no);
                    continue;
                }
            };

            if last_seen.is_some_and(|prev| record.date < prev) {
                report.sorted = false;
            }
            last_seen = Some(record.date);

            let date = record.date;
            if archive.records.insert(date, record.word).is_some() {
                warn::emit(WarnEvent {
                    code: WarnCode::W002DuplicateDate,
                    stage: "load",
                    action: "keep-last",
                    date: &date.to_string(),
                    reason: &format!("line {line_no}"),
                    err: "",
                });
                report.duplicate_dates.push(date);
            }
        }

        if !report.sorted {
            warn::emit(WarnEvent {
                code: WarnCode::W003Unsorted,
                stage: "load",
                action: "resort",
                date: "",
                reason: "archive lines out of date order",
                err: "",
            });
        }

        report.canonical = raw == archive.render();
        (archive, report)
    }

    /// Load the archive at `path`. A missing file is an empty archive.
    pub fn load(path: &Path) -> Result<(Self, LoadReport)> {
        if !path.exists() {
            let report = LoadReport {
                existed: false,
                sorted: true,
                canonical: true,
                ..LoadReport::default()
            };
            return Ok((Self::new(), report));
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Ok(Self::parse(&raw))
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for record in self.records() {
            out.push_str(&record.to_line());
            out.push('\n');
        }
        out
    }

    /// Rewrite the whole file in date order, replacing it atomically.
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;

        let mut tmp = tempfile::NamedTempFile::new_in(&parent)
            .with_context(|| format!("failed to create temp file in {}", parent.display()))?;
        tmp.write_all(self.render().as_bytes())
            .with_context(|| format!("failed to write temp file for {}", path.display()))?;
        tmp.as_file().sync_all()?;
        tmp.persist(path)
            .with_context(|| format!("failed to replace {}", path.display()))?;
        Ok(())
    }

    pub fn upsert(&mut self, record: SolutionRecord) -> UpsertOutcome {
        match self.records.insert(record.date, record.word.clone()) {
            None => UpsertOutcome::Inserted,
            Some(prev) if prev == record.word => UpsertOutcome::Unchanged,
            Some(_) => UpsertOutcome::Updated,
        }
    }

    pub fn get(&self, date: NaiveDate) -> Option<&str> {
        self.records.get(&date).map(String::as_str)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.records.contains_key(&date)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.records.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.records.keys().next_back().copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = SolutionRecord> + '_ {
        self.records.iter().map(|(date, word)| SolutionRecord {
            date: *date,
            word: word.clone(),
        })
    }
}

/// Exclusive lock on the archive's sidecar lock file, released on drop.
#[derive(Debug)]
pub struct ArchiveLock {
    file: fs::File,
}

impl ArchiveLock {
    pub fn acquire(paths: &WordlePaths) -> Result<Self> {
        let path = paths.lock_file();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let file = fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        if file.try_lock_exclusive().is_err() {
            return Err(WordleError::ArchiveLocked(path).into());
        }
        Ok(Self { file })
    }
}

impl Drop for ArchiveLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn day(raw: &str) -> NaiveDate {
        parse_date(raw).expect("date")
    }

    #[test]
    fn parse_line_uppercases_word() {
        let record = SolutionRecord::parse_line("2021-06-19 cigar").expect("record");
        assert_eq!(record.date, day("2021-06-19"));
        assert_eq!(record.word, "CIGAR");
        assert_eq!(record.to_line(), "2021-06-19 CIGAR");
    }

    #[test]
    fn parse_line_rejects_malformed_input() {
        assert!(SolutionRecord::parse_line("2021-06-19").is_err());
        assert!(SolutionRecord::parse_line("2021-06-19 CIGAR extra").is_err());
        assert!(SolutionRecord::parse_line("19-06-2021 CIGAR").is_err());
        assert!(SolutionRecord::parse_line("2021-06-19 C1GAR").is_err());
    }

    #[test]
    fn write_then_read_keeps_records() {
        let tmp = tempdir().expect("tempdir");
        let path = tmp.path().join("solutions.txt");

        let mut archive = SolutionArchive::new();
        archive.upsert(SolutionRecord::new(day("2021-06-20"), "REBUT"));
        archive.upsert(SolutionRecord::new(day("2021-06-19"), "CIGAR"));
        archive.upsert(SolutionRecord::new(day("2021-06-21"), "SISSY"));
        archive.save(&path).expect("save");

        let (loaded, report) = SolutionArchive::load(&path).expect("load");
        assert!(report.is_clean());
        assert_eq!(loaded, archive);
        assert_eq!(
            fs::read_to_string(&path).expect("read"),
            "2021-06-19 CIGAR\n2021-06-20 REBUT\n2021-06-21 SISSY\n"
        );
    }

    #[test]
    fn unsorted_input_is_resorted_with_same_records() {
        let raw = "2021-06-21 SISSY\n2021-06-19 CIGAR\n2021-06-20 REBUT\n";
        let (archive, report) = SolutionArchive::parse(raw);

        assert!(!report.sorted);
        assert!(report.needs_rewrite());
        assert_eq!(archive.len(), 3);
        assert_eq!(
            archive.render(),
            "2021-06-19 CIGAR\n2021-06-20 REBUT\n2021-06-21 SISSY\n"
        );
    }

    #[test]
    fn malformed_and_blank_lines_are_skipped() {
        let raw = "2021-06-19 CIGAR\n\nnot a record\n2021-06-20 REBUT\n2021-13-01 BAD\n";
        let (archive, report) = SolutionArchive::parse(raw);

        assert_eq!(archive.len(), 2);
        assert_eq!(report.skipped_lines, vec![3, 5]);
        assert!(report.sorted);
        assert!(!report.canonical);
        assert!(report.needs_rewrite());
        assert!(!report.is_clean());
    }

    #[test]
    fn non_canonical_layout_needs_rewrite() {
        let raw = "2021-06-19 cigar\r\n2021-06-20\tREBUT";
        let (archive, report) = SolutionArchive::parse(raw);

        assert!(report.sorted);
        assert!(report.skipped_lines.is_empty());
        assert!(!report.canonical);
        assert!(report.needs_rewrite());
        assert!(!report.is_clean());
        assert_eq!(archive.render(), "2021-06-19 CIGAR\n2021-06-20 REBUT\n");
    }

    #[test]
    fn canonical_file_is_clean() {
        let (_, report) = SolutionArchive::parse("2021-06-19 CIGAR\n2021-06-20 REBUT\n");
        assert!(report.canonical);
        assert!(report.is_clean());

        let (_, empty) = SolutionArchive::parse("");
        assert!(empty.is_clean());
    }

    #[test]
    fn duplicate_dates_keep_last_occurrence() {
        let raw = "2021-06-19 CIGAR\n2021-06-19 OTHER\n";
        let (archive, report) = SolutionArchive::parse(raw);

        assert_eq!(archive.len(), 1);
        assert_eq!(archive.get(day("2021-06-19")), Some("OTHER"));
        assert_eq!(report.duplicate_dates, vec![day("2021-06-19")]);
        assert!(report.needs_rewrite());
    }

    #[test]
    fn missing_file_loads_empty() {
        let tmp = tempdir().expect("tempdir");
        let (archive, report) =
            SolutionArchive::load(&tmp.path().join("absent.txt")).expect("load");
        assert!(archive.is_empty());
        assert!(!report.existed);
        assert!(report.is_clean());
    }

    #[test]
    fn upsert_reports_insert_update_and_noop() {
        let mut archive = SolutionArchive::new();
        let date = day("2025-01-15");
        assert_eq!(
            archive.upsert(SolutionRecord::new(date, "wound")),
            UpsertOutcome::Inserted
        );
        assert_eq!(
            archive.upsert(SolutionRecord::new(date, "WOUND")),
            UpsertOutcome::Unchanged
        );
        assert_eq!(
            archive.upsert(SolutionRecord::new(date, "OTHER")),
            UpsertOutcome::Updated
        );
        assert_eq!(archive.len(), 1);
    }

    #[test]
    fn first_and_last_follow_date_order() {
        let (archive, _) = SolutionArchive::parse("2022-01-02 BBBBB\n2021-12-31 AAAAA\n");
        assert_eq!(archive.first_date(), Some(day("2021-12-31")));
        assert_eq!(archive.last_date(), Some(day("2022-01-02")));
    }

    #[test]
    fn second_lock_on_same_archive_is_refused() {
        let tmp = tempdir().expect("tempdir");
        let paths = WordlePaths::under(tmp.path());

        let held = ArchiveLock::acquire(&paths).expect("first lock");
        let err = ArchiveLock::acquire(&paths).expect_err("second lock");
        assert!(err.to_string().contains("locked"));
        drop(held);

        ArchiveLock::acquire(&paths).expect("lock after release");
    }
}
