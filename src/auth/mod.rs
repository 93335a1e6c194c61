//! Credential primitives: password hashing and access tokens.
//!
//! These are used only by [`crate::application::services::AuthService`];
//! the short URL core never handles credentials.

pub mod jwt;
pub mod password;
