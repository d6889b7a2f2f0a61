//! HTTP request handlers for API endpoints.

pub mod ping;
pub mod redirect;
pub mod shorten;
pub mod user_urls;

pub use ping::ping_handler;
pub use redirect::redirect_handler;
pub use shorten::{batch_shorten_handler, shorten_handler};
pub use user_urls::{delete_user_urls_handler, list_user_urls_handler};
