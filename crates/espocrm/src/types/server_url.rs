//! Server base URL type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::Error;

/// A validated EspoCRM server base URL.
///
/// The URL must be absolute, have a host, and use HTTPS (HTTP is allowed
/// for localhost). A sub-path base such as `https://host/espo` is preserved
/// when composing endpoint URLs, so installs under a path prefix work.
///
/// # Example
///
/// ```
/// use espocrm::ServerUrl;
///
/// let server = ServerUrl::new("https://crm.example.com").unwrap();
/// let url = server.join("/api/v1/Account").unwrap();
/// assert_eq!(url.as_str(), "https://crm.example.com/api/v1/Account");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ServerUrl(Url);

impl ServerUrl {
    /// Create a new server URL from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not valid or doesn't meet requirements.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let url = Url::parse(s).map_err(|e| Error::InvalidUrl {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, s)?;

        // Normalize: remove trailing slash so joins are unambiguous
        let normalized = if url.path().ends_with('/') {
            let mut u = url.clone();
            let trimmed = u.path().trim_end_matches('/').to_string();
            u.set_path(&trimmed);
            u
        } else {
            url
        };

        Ok(Self(normalized))
    }

    /// Compose an endpoint URL by appending an absolute path to the base.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the combined string does not parse
    /// as a URL.
    pub fn join(&self, path: &str) -> Result<Url, Error> {
        let combined = format!("{}{}", self.0.as_str().trim_end_matches('/'), path);
        Url::parse(&combined).map_err(|e| Error::InvalidUrl {
            value: combined.clone(),
            reason: e.to_string(),
        })
    }

    /// Returns the base URL as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the inner URL.
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    fn validate(url: &Url, original: &str) -> Result<(), Error> {
        if url.cannot_be_a_base() {
            return Err(Error::InvalidUrl {
                value: original.to_string(),
                reason: "must be an absolute URL".to_string(),
            });
        }

        let scheme = url.scheme();
        let is_localhost = url
            .host_str()
            .is_some_and(|h| h == "localhost" || h == "127.0.0.1" || h == "::1");

        if scheme != "https" && !(scheme == "http" && is_localhost) {
            return Err(Error::InvalidUrl {
                value: original.to_string(),
                reason: "must use HTTPS (HTTP allowed only for localhost)".to_string(),
            });
        }

        if url.host_str().is_none() {
            return Err(Error::InvalidUrl {
                value: original.to_string(),
                reason: "must have a host".to_string(),
            });
        }

        Ok(())
    }
}

impl fmt::Display for ServerUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ServerUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for ServerUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.0.as_str())
    }
}

impl<'de> Deserialize<'de> for ServerUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ServerUrl::new(&s).map_err(serde::de::Error::custom)
    }
}

impl AsRef<str> for ServerUrl {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}
