use crate::models::{CommentId, CommentNode, PostId};
use serde::{Deserialize, Serialize};

/// Change notifications fanned out to live subscribers of a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CommentEvent {
    CommentCreated {
        post_id: PostId,
        comment: CommentNode,
    },
    CommentsDeleted {
        post_id: PostId,
        comment_ids: Vec<CommentId>,
    },
    CommentLiked {
        post_id: PostId,
        comment_id: CommentId,
        like_count: usize,
    },
}

impl CommentEvent {
    pub fn post_id(&self) -> &str {
        match self {
            CommentEvent::CommentCreated { post_id, .. }
            | CommentEvent::CommentsDeleted { post_id, .. }
            | CommentEvent::CommentLiked { post_id, .. } => post_id,
        }
    }
}
