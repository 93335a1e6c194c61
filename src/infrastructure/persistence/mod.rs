//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx. Queries
//! are bound at runtime and mapped through private `FromRow` row types.
//!
//! # Repositories
//!
//! - [`PgShortUrlRepository`] - Short URL storage, resolution and owner-scoped CRUD
//! - [`PgUserRepository`] - User accounts and external identity linkage

pub mod pg_short_url_repository;
pub mod pg_user_repository;

pub use pg_short_url_repository::PgShortUrlRepository;
pub use pg_user_repository::PgUserRepository;
