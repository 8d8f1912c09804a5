use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub type CommentId = String;
pub type PostId = String;
pub type UserId = String;

pub const UNKNOWN_AUTHOR_NAME: &str = "Unknown";

/// A comment row as read from storage, before threading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentRecord {
    pub id: CommentId,
    pub post_id: PostId,
    pub parent_id: Option<CommentId>,
    pub author_id: UserId,
    pub content: String,
    pub created_at: NaiveDateTime,
    pub is_suspended: bool,
    /// Users who liked this comment.
    pub like_refs: BTreeSet<UserId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorProjection {
    pub id: UserId,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

impl AuthorProjection {
    /// Stand-in for an author whose profile can no longer be resolved.
    pub fn placeholder(id: impl Into<UserId>) -> Self {
        Self {
            id: id.into(),
            display_name: UNKNOWN_AUTHOR_NAME.to_string(),
            avatar_url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeRecord {
    pub comment_id: CommentId,
    pub user_id: UserId,
}

/// Presentation-ready comment with its direct replies.
///
/// Serialization walks `replies` recursively; `tree::assemble` keeps nesting under
/// [`crate::MAX_NESTING`] so a rendered tree stays shallow. Dropping is iterative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentNode {
    pub id: CommentId,
    pub post_id: PostId,
    pub parent_id: Option<CommentId>,
    pub content: String,
    pub created_at: NaiveDateTime,
    pub author: AuthorProjection,
    pub like_count: usize,
    pub replies: Vec<CommentNode>,
}

impl From<CommentRecord> for CommentNode {
    fn from(record: CommentRecord) -> Self {
        CommentNode {
            like_count: record.like_refs.len(),
            author: AuthorProjection::placeholder(record.author_id),
            id: record.id,
            post_id: record.post_id,
            parent_id: record.parent_id,
            content: record.content,
            created_at: record.created_at,
            replies: Vec::new(),
        }
    }
}

impl Drop for CommentNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.replies);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.replies);
        }
    }
}

impl CommentNode {
    /// Number of nodes in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.replies.iter());
        }
        count
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub author_id: UserId,
    pub title: String,
    pub body: String,
    pub created_at: NaiveDateTime,
}
