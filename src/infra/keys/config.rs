use crate::error::{AnalyzerError, Result};
use anyhow::Context;
use serde::Deserialize;
use std::fmt;

pub const CLIENT_ID_VAR: &str = "SPOTIFY_CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "SPOTIFY_CLIENT_SECRET";

/// Client-credentials pair for the Spotify Web API.
///
/// Read from the environment, or from a JSON secrets file on disk:
/// ```json
/// {
///   "spotify": {
///     "client_id": "...",
///     "client_secret": "..."
///   }
/// }
/// ```
#[derive(Clone, Deserialize)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Deserialize)]
struct SecretsFile {
    spotify: SpotifyCredentials,
}

impl SpotifyCredentials {
    /// Loads the credentials from a JSON secrets file at `path`.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read secrets file '{path}'"))?;
        Self::from_json(&content).with_context(|| format!("failed to parse secrets file '{path}'"))
    }

    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        let secrets: SecretsFile = serde_json::from_str(content)?;
        Ok(secrets.spotify)
    }

    /// Reads `SPOTIFY_CLIENT_ID` / `SPOTIFY_CLIENT_SECRET`. Blank values count as unset.
    pub fn from_env() -> Option<Self> {
        let read = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Some(Self {
            client_id: read(CLIENT_ID_VAR)?,
            client_secret: read(CLIENT_SECRET_VAR)?,
        })
    }

    /// Secrets file when one is given, otherwise the environment.
    pub fn resolve(secrets_path: Option<&str>) -> Result<Self> {
        let credentials = match secrets_path {
            Some(path) => {
                Self::load(path).map_err(|e| AnalyzerError::MissingCredentials(format!("{e:#}")))?
            }
            None => Self::from_env().ok_or_else(|| {
                AnalyzerError::MissingCredentials(format!(
                    "set {CLIENT_ID_VAR} and {CLIENT_SECRET_VAR} or pass --secrets"
                ))
            })?,
        };

        if credentials.client_id.trim().is_empty() || credentials.client_secret.trim().is_empty() {
            return Err(AnalyzerError::MissingCredentials(
                "client_id and client_secret must not be empty".into(),
            ));
        }
        Ok(credentials)
    }
}

impl fmt::Debug for SpotifyCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpotifyCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}
