//! Content gateway in front of a WordPress REST API.
//!
//! A [`Gateway`] talks to exactly one upstream, either a self-hosted `wp/v2`
//! site or a WordPress.com v1.1 site, and hands out canonical
//! [`wpgate_core::Post`], [`wpgate_core::Category`] and
//! [`wpgate_core::Comment`] values. Listing operations never fail: they log
//! and come back empty. Comment submission falls back to a local store.

mod cancel;
mod category;
mod comments;
pub mod error;
pub mod filter;
mod gateway;
mod strategy;
pub mod transport;
pub mod upstream;

pub use self::cancel::Scoped;
pub use self::filter::{CategoryRef, DEFAULT_PER_PAGE, PostFilter};
pub use self::gateway::{DEFAULT_COMMENTS_KEY, Gateway};
pub use self::strategy::{CategoryListing, Strategy, category_strategies, section_strategies};
pub use self::transport::{ReqwestTransport, Transport, UpstreamResponse};

pub(crate) const LOG_TARGET: &str = "wpgate::gateway";
