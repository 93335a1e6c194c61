//! Domain layer containing business entities and repository contracts.
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//!
//! The domain layer has no dependencies on infrastructure or presentation
//! layers; services in [`crate::application::services`] consume the
//! repository traits.

pub mod entities;
pub mod repositories;
