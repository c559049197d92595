use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::{self, CommandReport};

#[derive(Parser, Debug)]
#[command(name = "wordle")]
#[command(about = "Keep a sorted, gap-free archive of daily Wordle solutions", long_about = None)]
struct Cli {
    /// Archive file (overrides WORDLE_ARCHIVE_FILE)
    #[arg(long, global = true)]
    file: Option<PathBuf>,

    /// Print the command report as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch missing solutions, or a single date when one is given
    Fetch {
        /// Date to fetch (YYYY-MM-DD)
        date: Option<String>,

        /// Refetch a date that is already stored
        #[arg(long, requires = "date")]
        force: bool,

        /// Fetch at most this many missing dates
        #[arg(long, conflicts_with = "date")]
        max: Option<usize>,

        /// Report what would be fetched without fetching or writing
        #[arg(long, conflicts_with = "date")]
        dry_run: bool,
    },
    /// Report missing dates from the start date without fetching
    Missing {
        /// Number of dates to list
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Re-sort the archive and drop malformed or duplicate lines
    Repair,
    /// Show resolved paths, config and archive totals
    Status,
}

fn print_report(report: &CommandReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{}", report.render_text());
    }
    Ok(())
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let report = match cli.command {
        Command::Fetch {
            date,
            force,
            max,
            dry_run,
        } => commands::fetch::run(&commands::fetch::FetchOptions {
            date,
            force,
            max_fetches: max,
            dry_run,
            archive_file: cli.file,
        })?,
        Command::Missing { limit } => commands::missing::run(&commands::missing::MissingOptions {
            limit,
            archive_file: cli.file,
        })?,
        Command::Repair => commands::repair::run(cli.file)?,
        Command::Status => commands::status::run(cli.file)?,
    };

    print_report(&report, cli.json)?;
    if !report.ok {
        anyhow::bail!(
            "{} reported {} issue(s)",
            report.command,
            report.issues.len()
        );
    }
    Ok(())
}
