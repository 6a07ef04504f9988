//! Domain entities - the core business objects.

mod like;
mod post;
mod user;

pub use like::{Like, LikeAction, LikeStatus, LikeToggle};
pub use post::{
    ContentSection, ModerationPatch, NewPost, Post, PostRef, PostRevision, PostStatus, PostType,
    ReviewBucket, ReviewStats, normalize_slug,
};
pub use user::{Role, User};
