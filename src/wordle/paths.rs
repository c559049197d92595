use anyhow::Result;
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct WordlePaths {
    pub wordle_home: PathBuf,
    pub archive_file: PathBuf,
    pub logs_dir: PathBuf,
    pub config_file: PathBuf,
}

impl WordlePaths {
    /// All paths rooted under `home`, as used when no env overrides apply.
    pub fn under(home: &Path) -> Self {
        Self {
            wordle_home: home.to_path_buf(),
            archive_file: home.join("solutions.txt"),
            logs_dir: home.join("logs"),
            config_file: home.join("wordle.toml"),
        }
    }

    pub fn with_archive_file(mut self, archive_file: Option<PathBuf>) -> Self {
        if let Some(file) = archive_file {
            self.archive_file = file;
        }
        self
    }

    pub fn lock_file(&self) -> PathBuf {
        let mut name = self
            .archive_file
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "solutions.txt".into());
        name.push(".lock");
        self.archive_file.with_file_name(name)
    }
}

fn required_home_dir() -> Result<PathBuf> {
    if let Some(home) = dirs::home_dir() {
        return Ok(home);
    }
    Err(anyhow::anyhow!("HOME directory could not be resolved"))
}

fn env_or_default_path(var: &str, fallback: PathBuf) -> PathBuf {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => PathBuf::from(v.trim()),
        _ => fallback,
    }
}

pub fn resolve_paths() -> Result<WordlePaths> {
    let wordle_home = match env::var("WORDLE_HOME") {
        Ok(v) if !v.trim().is_empty() => PathBuf::from(v.trim()),
        _ => required_home_dir()?.join("wordle"),
    };
    let defaults = WordlePaths::under(&wordle_home);

    Ok(WordlePaths {
        archive_file: env_or_default_path("WORDLE_ARCHIVE_FILE", defaults.archive_file),
        logs_dir: env_or_default_path("WORDLE_LOGS_DIR", defaults.logs_dir),
        config_file: env_or_default_path("WORDLE_CONFIG_PATH", defaults.config_file),
        wordle_home,
    })
}
