use crate::error::WordleError;
use crate::wordle::archive::{SolutionRecord, is_valid_word};
use crate::wordle::config::WordleApiConfig;
use crate::wordle::util::DATE_FORMAT;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedSolution {
    pub record: SolutionRecord,
    pub puzzle_number: Option<u32>,
    pub editor: Option<String>,
}

pub trait SolutionSource {
    fn fetch(&self, date: NaiveDate) -> Result<FetchedSolution>;
}

#[derive(Debug, Deserialize)]
struct SolutionResponse {
    solution: Option<String>,
    print_date: Option<String>,
    days_since_launch: Option<u32>,
    editor: Option<String>,
}

fn parse_response(date: NaiveDate, body: &str) -> Result<FetchedSolution> {
    let parsed: SolutionResponse = serde_json::from_str(body)
        .with_context(|| format!("response for {date} is not a solution object"))?;

    let word = parsed
        .solution
        .map(|w| w.trim().to_string())
        .filter(|w| !w.is_empty())
        .ok_or(WordleError::MissingSolution(date))?;
    if !is_valid_word(&word) {
        return Err(WordleError::MalformedSolution { date, word }.into());
    }

    let requested = date.format(DATE_FORMAT).to_string();
    if let Some(returned) = parsed.print_date.filter(|d| !d.trim().is_empty()) {
        if returned.trim() != requested {
            return Err(WordleError::DateMismatch {
                requested: date,
                returned,
            }
            .into());
        }
    }

    Ok(FetchedSolution {
        record: SolutionRecord::new(date, &word),
        puzzle_number: parsed.days_since_launch,
        editor: parsed.editor.filter(|e| !e.trim().is_empty()),
    })
}

pub struct HttpSolutionSource {
    client: Client,
    base_url: String,
}

impl HttpSolutionSource {
    pub fn new(cfg: &WordleApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            client,
            base_url: cfg.base_url.trim().trim_end_matches('/').to_string(),
        })
    }

    pub fn url_for(&self, date: NaiveDate) -> String {
        format!("{}/{}.json", self.base_url, date.format(DATE_FORMAT))
    }
}

impl SolutionSource for HttpSolutionSource {
    fn fetch(&self, date: NaiveDate) -> Result<FetchedSolution> {
        let url = self.url_for(date);
        let response = self
            .client
            .get(&url)
            .send()
            .with_context(|| format!("request to {url} failed"))?;
        let status = response.status();
        if !status.is_success() {
            return Err(WordleError::FetchStatus {
                date,
                status: status.as_u16(),
            }
            .into());
        }
        let body = response
            .text()
            .with_context(|| format!("failed to read response body from {url}"))?;
        parse_response(date, &body)
    }
}
