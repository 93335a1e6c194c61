//! Utility functions shared across layers.
//!
//! - [`code_generator`] - Short code generation and custom code validation
//! - [`url_validator`] - Target URL validation
//! - [`cookies`] - Request cookie lookup

pub mod code_generator;
pub mod cookies;
pub mod url_validator;
