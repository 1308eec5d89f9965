//! Canonical content model shared by the gateway and its front-ends.
//!
//! Upstream WordPress APIs come in two incompatible flavors. Everything in
//! here is about turning either of them into one [`Post`], [`Category`] and
//! [`Comment`] shape, plus the small helpers the pages need to display them.

pub mod category;
pub mod comment;
pub mod date;
pub mod fmt;
pub mod image;
pub mod post;
pub mod upstream;

pub use category::{Category, SECTIONS, Section};
pub use comment::{
    Comment, CommentDraft, CommentStatus, DraftError, LocalComment, PostRef, RemoteComment,
};
pub use post::{Embedded, FeaturedMedia, Post, PostPage, Rendered};
pub use upstream::{Flavor, UpstreamComment, UpstreamPost};
