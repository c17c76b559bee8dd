//! espocrm - EspoCRM REST API Client
//!
//! This library provides a typed asynchronous client for the EspoCRM REST
//! API. Entity schemas are not known at compile time: records carry
//! caller-defined fields of heterogeneous JSON types, modeled by
//! [`Record`] and [`JsonValue`]. Typed operations flow through a single
//! [`EspoClient`], which handles authentication, status classification,
//! and response decoding.
//!
//! # Example
//!
//! ```no_run
//! use espocrm::{Config, Entity, EspoClient, ListParams, ListResponse, Record, ServerUrl};
//!
//! # async fn example() -> Result<(), espocrm::Error> {
//! let server = ServerUrl::new("https://crm.example.com")?;
//! let client = EspoClient::new(Config::new(server));
//! client.login("admin", "password").await?;
//!
//! let accounts: ListResponse<Record> = client
//!     .list(&Entity::new("Account")?, &ListParams::default())
//!     .await?;
//!
//! println!("{} of {:?} accounts", accounts.list.len(), accounts.total);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod record;
pub mod types;

// Re-export primary types at crate root for convenience
pub use auth::{AccessToken, ApiKey, AuthSession, RefreshToken};
pub use client::{Config, EspoClient, ListParams, ListResponse, Order};
pub use error::Error;
pub use record::{JsonValue, Record};
pub use types::{Entity, ServerUrl};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
