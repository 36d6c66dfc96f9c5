use std::path::PathBuf;

use clap::Parser;
use directories::ProjectDirs;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:3002";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("api url must start with http:// or https://, got `{0}`")]
    InvalidApiUrl(String),

    #[error("could not determine a data directory for the log file; pass --log-file")]
    NoDataDir,
}

#[derive(Parser, Debug)]
#[command(name = "notes-list")]
#[command(about = "Browse and add notes from a notes-list service")]
#[command(version)]
pub struct Cli {
    /// Base URL of the notes service
    #[arg(long, env = "NOTES_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Where to write logs (the terminal is taken by the UI)
    #[arg(long, env = "NOTES_LOG_FILE", value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    pub log_file: PathBuf,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Config, ConfigError> {
        let api_url = normalize_api_url(&cli.api_url)?;
        let log_file = match cli.log_file {
            Some(path) => path,
            None => default_log_file()?,
        };

        Ok(Config { api_url, log_file })
    }
}

fn normalize_api_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_string())
    } else {
        Err(ConfigError::InvalidApiUrl(raw.to_string()))
    }
}

fn default_log_file() -> Result<PathBuf, ConfigError> {
    let dirs = ProjectDirs::from("", "", "notes-list").ok_or(ConfigError::NoDataDir)?;
    Ok(dirs.data_local_dir().join("notes-list.log"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_to_local_service() {
        let cli = Cli::try_parse_from(["notes-list", "--log-file", "/tmp/notes.log"]).unwrap();

        let config = Config::from_cli(cli).unwrap();

        assert_eq!(
            config,
            Config {
                api_url: DEFAULT_API_URL.to_string(),
                log_file: PathBuf::from("/tmp/notes.log"),
            }
        );
    }

    #[test]
    fn api_url_is_trimmed() {
        assert_eq!(
            normalize_api_url(" https://notes.example.com/ ").unwrap(),
            "https://notes.example.com"
        );
    }

    #[test]
    fn api_url_requires_http_scheme() {
        assert_eq!(
            normalize_api_url("localhost:3002"),
            Err(ConfigError::InvalidApiUrl("localhost:3002".to_string()))
        );
    }
}
