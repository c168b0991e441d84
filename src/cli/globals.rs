use crate::cli::commands::api::{ARG_API_URL, ARG_SESSION_FILE};
use crate::console::{ApiClient, SessionStore};
use anyhow::{Context, Result};
use std::{env, path::PathBuf};

const SESSION_FILE_NAME: &str = "session.json";

#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub api_url: String,
    pub session_file: PathBuf,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(api_url: String, session_file: PathBuf) -> Self {
        Self {
            api_url,
            session_file,
        }
    }

    /// # Errors
    /// Returns an error if the API URL is missing.
    pub fn from_matches(matches: &clap::ArgMatches) -> Result<Self> {
        let api_url = matches
            .get_one::<String>(ARG_API_URL)
            .cloned()
            .context("missing required argument: --api-url")?;

        let session_file = matches
            .get_one::<String>(ARG_SESSION_FILE)
            .map_or_else(default_session_file, PathBuf::from);

        Ok(Self::new(api_url, session_file))
    }

    #[must_use]
    pub fn session_store(&self) -> SessionStore {
        SessionStore::new(&self.session_file)
    }

    /// API client carrying the stored session, if any.
    ///
    /// # Errors
    /// Returns an error if the session file is unreadable or the URL is invalid.
    pub fn client(&self) -> Result<ApiClient> {
        let session = self
            .session_store()
            .load()
            .context("failed to load session")?;

        ApiClient::new(&self.api_url, session).context("failed to build API client")
    }
}

/// `$XDG_CONFIG_HOME/gatepass/session.json`, else `~/.config/gatepass/session.json`.
#[must_use]
pub fn default_session_file() -> PathBuf {
    let config_dir = env::var_os("XDG_CONFIG_HOME")
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")));

    match config_dir {
        Some(dir) => dir.join(env!("CARGO_PKG_NAME")).join(SESSION_FILE_NAME),
        None => PathBuf::from(format!(".{}-{SESSION_FILE_NAME}", env!("CARGO_PKG_NAME"))),
    }
}
