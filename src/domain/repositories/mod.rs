//! Repository trait definitions for the domain layer.
//!
//! Traits define the data-access contract; PostgreSQL implementations live in
//! `crate::infrastructure::persistence`. Mock implementations are generated
//! with `mockall` for unit tests.
//!
//! - [`ShortUrlRepository`] - Short URL storage, resolution and owner-scoped CRUD
//! - [`UserRepository`] - User accounts and external identity linkage

pub mod short_url_repository;
pub mod user_repository;

pub use short_url_repository::ShortUrlRepository;
pub use user_repository::UserRepository;

#[cfg(test)]
pub use short_url_repository::MockShortUrlRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
