//! Authentication types and session state.
//!
//! A session is established by [`EspoClient::login`](crate::EspoClient::login)
//! and consumed by every subsequent authenticated request. A pre-shared
//! [`ApiKey`] configured on the client bypasses login entirely.

mod session;
mod tokens;

pub use session::AuthSession;
pub use tokens::{AccessToken, ApiKey, RefreshToken};
