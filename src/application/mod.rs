//! Application layer services implementing business logic.
//!
//! Services consume repository traits and expose the operations HTTP
//! handlers call. They own validation, retry policy and store timeouts.
//!
//! # Available Services
//!
//! - [`services::short_url_service::ShortUrlService`] - Code allocation, resolution and owner-scoped CRUD
//! - [`services::auth_service::AuthService`] - Accounts, passwords and access tokens

pub mod services;
