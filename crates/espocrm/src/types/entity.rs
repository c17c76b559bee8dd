//! Entity type name.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A validated entity type name.
///
/// Entity types identify a resource exposed by the EspoCRM API, such as
/// `Account` or `Opportunity`. Names are ASCII, start with a letter, and
/// contain only letters and digits, so they can be spliced into a request
/// path without escaping.
///
/// # Example
///
/// ```
/// use espocrm::Entity;
///
/// let entity = Entity::new("Account").unwrap();
/// assert_eq!(entity.as_str(), "Account");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Entity(String);

impl Entity {
    /// Create a new entity type name, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty, does not start with a letter,
    /// or contains anything other than ASCII letters and digits.
    pub fn new(s: impl Into<String>) -> Result<Self, Error> {
        let s = s.into();
        Self::validate(&s)?;
        Ok(Self(s))
    }

    /// Returns the entity type name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(s: &str) -> Result<(), Error> {
        if s.is_empty() {
            return Err(Error::InvalidEntity {
                value: s.to_string(),
                reason: "cannot be empty".to_string(),
            });
        }

        let first = s.chars().next().unwrap();
        if !first.is_ascii_alphabetic() {
            return Err(Error::InvalidEntity {
                value: s.to_string(),
                reason: "must start with a letter".to_string(),
            });
        }

        for c in s.chars() {
            if !c.is_ascii_alphanumeric() {
                return Err(Error::InvalidEntity {
                    value: s.to_string(),
                    reason: format!("contains invalid character '{}'", c),
                });
            }
        }

        Ok(())
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Entity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Entity {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Entity> for String {
    fn from(entity: Entity) -> Self {
        entity.0
    }
}

impl AsRef<str> for Entity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
