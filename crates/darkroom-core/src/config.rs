//! Configuration module
//!
//! Environment-driven settings for the client stack. Binaries load a
//! `.env` file (via `dotenvy`) before calling [`Config::from_env`].

use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_API_URL: &str = "http://localhost:8080";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const SESSION_FILE_NAME: &str = "session.json";

/// Client configuration shared by the SDK and the CLI.
#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the Darkroom backend, without a trailing slash.
    pub api_url: String,
    /// Per-request timeout applied to every HTTP call.
    pub request_timeout: Duration,
    /// Where the session credential pair is persisted across restarts.
    pub session_file: PathBuf,
}

impl Config {
    /// Reads configuration from the environment:
    /// `DARKROOM_API_URL`, `DARKROOM_TIMEOUT_SECS`, `DARKROOM_SESSION_FILE`.
    pub fn from_env() -> Self {
        let api_url = env::var("DARKROOM_API_URL")
            .or_else(|_| env::var("API_URL"))
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let timeout_secs = env::var("DARKROOM_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let session_file = env::var("DARKROOM_SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_session_file());

        Config {
            api_url: api_url.trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(timeout_secs),
            session_file,
        }
    }

    /// Configuration pointing at an explicit backend, with defaults for the
    /// rest. Used by tests and tooling that talk to a non-default server.
    pub fn with_api_url(api_url: impl Into<String>) -> Self {
        let api_url: String = api_url.into();
        Config {
            api_url: api_url.trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            session_file: default_session_file(),
        }
    }
}

fn default_session_file() -> PathBuf {
    let base = env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."));
    base.join(".darkroom").join(SESSION_FILE_NAME)
}
