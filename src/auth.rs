//! Credential loader for the Granola desktop app session.
//!
//! The desktop app stores its session in `supabase.json`. The `workos_tokens`
//! member is itself a JSON document (usually encoded as a string) holding the
//! bearer token, when it was obtained (epoch millis) and its lifetime (seconds).
//!
//! Refreshing is the desktop app's job; this module only reads and judges age.

use crate::error::{GranolaError, Result};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};

/// Freshness window used when the file does not state `expires_in`
pub const FRESHNESS_WINDOW_SECS: i64 = 6 * 60 * 60;

/// A session token read from the desktop app.
#[derive(Clone)]
pub struct Token {
    access_token: String,
    obtained_at: Option<DateTime<Utc>>,
    expires_at: Option<DateTime<Utc>>,
}

impl Token {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            obtained_at: None,
            expires_at: None,
        }
    }

    pub fn secret(&self) -> &str {
        &self.access_token
    }

    pub fn obtained_at(&self) -> Option<DateTime<Utc>> {
        self.obtained_at
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"<redacted>")
            .field("obtained_at", &self.obtained_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct SessionFile {
    #[serde(default)]
    workos_tokens: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct WorkosTokens {
    #[serde(default)]
    access_token: Option<String>,
    /// Epoch milliseconds
    #[serde(default)]
    obtained_at: Option<f64>,
    /// Seconds
    #[serde(default)]
    expires_in: Option<f64>,
}

/// Path of the desktop app's session file (macOS).
pub fn default_auth_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join("Library/Application Support/Granola/supabase.json")
}

/// Load the token from the default location.
pub fn load_token() -> Result<Token> {
    load_token_from(&default_auth_path(), Utc::now())
}

/// Load the token from `path`, judging its age against `now`.
pub fn load_token_from(path: &Path, now: DateTime<Utc>) -> Result<Token> {
    let missing = |reason: String| GranolaError::AuthMissing {
        path: path.to_path_buf(),
        reason,
    };

    if !path.exists() {
        return Err(missing("file does not exist".to_string()));
    }

    let content =
        std::fs::read_to_string(path).map_err(|e| missing(format!("cannot read file: {}", e)))?;
    let session: SessionFile =
        serde_json::from_str(&content).map_err(|e| missing(format!("invalid JSON: {}", e)))?;

    let tokens: WorkosTokens = match session.workos_tokens {
        Some(Value::String(raw)) => serde_json::from_str(&raw)
            .map_err(|e| missing(format!("invalid workos_tokens: {}", e)))?,
        Some(value @ Value::Object(_)) => serde_json::from_value(value)
            .map_err(|e| missing(format!("invalid workos_tokens: {}", e)))?,
        _ => return Err(missing("no workos_tokens entry".to_string())),
    };

    let access_token = tokens
        .access_token
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| missing("no access token".to_string()))?;

    let obtained_at = tokens
        .obtained_at
        .and_then(|ms| Utc.timestamp_millis_opt(ms as i64).single());

    let Some(obtained_at) = obtained_at else {
        tracing::warn!("Token has no obtained_at; cannot check expiry locally");
        return Ok(Token::new(access_token));
    };

    let window = tokens
        .expires_in
        .filter(|secs| *secs > 0.0)
        .map(|secs| Duration::seconds(secs as i64))
        .unwrap_or_else(|| Duration::seconds(FRESHNESS_WINDOW_SECS));
    let expires_at = obtained_at + window;

    if now > expires_at {
        return Err(GranolaError::AuthExpired {
            minutes_ago: (now - expires_at).num_minutes(),
        });
    }

    tracing::debug!(%expires_at, "loaded Granola token");
    Ok(Token {
        access_token,
        obtained_at: Some(obtained_at),
        expires_at: Some(expires_at),
    })
}
