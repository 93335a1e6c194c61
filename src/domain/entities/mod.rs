//! Core domain entities.
//!
//! - [`User`] - An account that owns short URLs
//! - [`ShortUrl`] - A short code mapped to a target URL
//!
//! Creation and update inputs live next to their entity
//! (`NewUser`, `NewShortUrl`, `ShortUrlPatch`).

pub mod short_url;
pub mod user;

pub use short_url::{NewShortUrl, ShortUrl, ShortUrlPatch};
pub use user::{ExternalProfile, NewUser, User};
