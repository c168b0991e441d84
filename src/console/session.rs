//! Auth session and its on-disk persistence. The session is an explicit value
//! handed to the API client; nothing reads the token from ambient state. The
//! token is a `SecretString` and must never reach logs or `Debug` output.

use super::error::{Error, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};
use tracing::debug;

#[derive(Clone, Debug, Default)]
pub struct Session {
    token: Option<SecretString>,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_token(token: SecretString) -> Self {
        Self { token: Some(token) }
    }

    #[must_use]
    pub const fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Route guard for commands that need a signed-in operator.
    ///
    /// # Errors
    /// Returns `Error::Unauthenticated` when no token is held.
    pub fn require(&self) -> Result<&SecretString> {
        self.token.as_ref().ok_or(Error::Unauthenticated)
    }
}

#[derive(Serialize, Deserialize)]
struct SessionFile {
    token: String,
}

/// Session file on disk, the CLI's counterpart of browser local storage.
#[derive(Clone, Debug)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the stored session; a missing file is an empty session.
    ///
    /// # Errors
    /// Returns `Error::Config` if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<Session> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("no session file at {}", self.path.display());
                return Ok(Session::new());
            }
            Err(err) => {
                return Err(Error::Config(format!(
                    "failed to read session file {}: {err}",
                    self.path.display()
                )))
            }
        };

        let file: SessionFile = serde_json::from_str(&raw).map_err(|err| {
            Error::Config(format!(
                "invalid session file {}: {err}",
                self.path.display()
            ))
        })?;

        if file.token.trim().is_empty() {
            return Ok(Session::new());
        }

        Ok(Session::with_token(SecretString::from(file.token)))
    }

    /// Writes the session token, creating parent directories as needed.
    ///
    /// # Errors
    /// Returns `Error::Validation` for an empty session and `Error::Config`
    /// when the file cannot be written.
    pub fn save(&self, session: &Session) -> Result<()> {
        let token = session
            .token()
            .ok_or_else(|| Error::validation("cannot store an empty session"))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| self.write_error(&err))?;
        }

        let body = serde_json::to_string(&SessionFile {
            token: token.expose_secret().to_string(),
        })
        .map_err(|err| Error::Config(format!("failed to encode session: {err}")))?;

        let mut file = open_private(&self.path).map_err(|err| self.write_error(&err))?;
        file.write_all(body.as_bytes())
            .map_err(|err| self.write_error(&err))?;

        debug!("session stored at {}", self.path.display());

        Ok(())
    }

    /// Removes the session file; a missing file is not an error.
    ///
    /// # Errors
    /// Returns `Error::Config` if the file exists but cannot be removed.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(self.write_error(&err)),
        }
    }

    fn write_error(&self, err: &std::io::Error) -> Error {
        Error::Config(format!(
            "failed to write session file {}: {err}",
            self.path.display()
        ))
    }
}

#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;

    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}
