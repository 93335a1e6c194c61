//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod auth;
pub mod health;
pub mod oauth;
pub mod redirect;
pub mod shorten;
pub mod urls;

pub use auth::{delete_me_handler, login_handler, me_handler, register_handler};
pub use health::health_handler;
pub use oauth::{google_callback_handler, google_login_handler};
pub use redirect::redirect_handler;
pub use shorten::shorten_handler;
pub use urls::{delete_url_handler, get_url_handler, list_user_urls_handler, update_url_handler};
