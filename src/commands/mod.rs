pub mod fetch;
pub mod missing;
pub mod repair;
pub mod status;

use crate::wordle::archive::LoadReport;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct CommandReport {
    pub command: String,
    pub ok: bool,
    pub details: Vec<String>,
    pub issues: Vec<String>,
}

impl CommandReport {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ok: true,
            details: Vec::new(),
            issues: Vec::new(),
        }
    }

    pub fn detail(&mut self, text: impl Into<String>) {
        self.details.push(text.into());
    }

    pub fn issue(&mut self, text: impl Into<String>) {
        self.ok = false;
        self.issues.push(text.into());
    }

    pub fn render_text(&self) -> String {
        let mut out = format!(
            "{}: {}\n",
            self.command,
            if self.ok { "ok" } else { "issues found" }
        );
        for line in &self.details {
            out.push_str(&format!("  {line}\n"));
        }
        for line in &self.issues {
            out.push_str(&format!("  ! {line}\n"));
        }
        out
    }
}

/// Details describing what loading the archive had to fix.
pub fn describe_load(report: &mut CommandReport, load: &LoadReport) {
    if !load.existed {
        report.detail("archive file did not exist; started empty");
    }
    if !load.sorted {
        report.detail("archive was not sorted; rewritten in date order");
    } else if !load.canonical && load.skipped_lines.is_empty() && load.duplicate_dates.is_empty()
    {
        report.detail("archive layout normalized to `YYYY-MM-DD WORD` lines");
    }
    if !load.skipped_lines.is_empty() {
        let lines: Vec<String> = load.skipped_lines.iter().map(usize::to_string).collect();
        report.detail(format!("skipped malformed lines: {}", lines.join(",")));
    }
    if !load.duplicate_dates.is_empty() {
        let dates: Vec<String> = load
            .duplicate_dates
            .iter()
            .map(|d| d.to_string())
            .collect();
        report.detail(format!(
            "collapsed duplicate dates (last kept): {}",
            dates.join(",")
        ));
    }
}
