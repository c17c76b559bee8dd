//! Session state established by login.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::tokens::{AccessToken, RefreshToken};

/// The credential state produced by a successful login.
///
/// The client holds at most one live session; a subsequent login replaces
/// it wholesale. The type is serde-round-trippable so callers can persist
/// a session and restore it with
/// [`EspoClient::restore_session`](crate::EspoClient::restore_session).
// The token newtypes redact themselves in Debug output
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    token: AccessToken,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<RefreshToken>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime<Utc>>,
}

impl AuthSession {
    /// Create a session from its parts.
    pub fn new(
        token: AccessToken,
        refresh_token: Option<RefreshToken>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            token,
            refresh_token,
            expires_at,
        }
    }

    /// Returns the bearer token.
    pub fn token(&self) -> &AccessToken {
        &self.token
    }

    /// Returns the refresh token, if the server issued one.
    pub fn refresh_token(&self) -> Option<&RefreshToken> {
        self.refresh_token.as_ref()
    }

    /// Returns the expiry timestamp, if the server reported one.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Returns true if the session carries an expiry in the past.
    ///
    /// A session with no expiry reported is never considered expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| at <= Utc::now())
    }
}
