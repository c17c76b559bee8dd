//! Validated input types.
//!
//! Externally-sourced identifiers are validated at the edge so the request
//! pipeline never has to reason about malformed input.

mod entity;
mod server_url;

pub use entity::Entity;
pub use server_url::ServerUrl;
