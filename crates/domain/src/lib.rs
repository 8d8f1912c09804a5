mod builder;
mod commands;
mod depth;
mod enrich;
mod error;
mod events;
mod models;
mod tree;

pub use builder::CommentTreeBuilder;
pub use commands::{NewComment, MAX_CONTENT_CHARS};
pub use depth::{check_depth, ParentSource, DEFAULT_MAX_DEPTH};
pub use enrich::{enrich, enrich_forest, AuthorIndex, LikeIndex};
pub use error::CommentError;
pub use events::CommentEvent;
pub use models::{
    AuthorProjection, CommentId, CommentNode, CommentRecord, LikeRecord, Post, PostId, UserId,
    UNKNOWN_AUTHOR_NAME,
};
pub use tree::{assemble, newest_first, MAX_NESTING};
