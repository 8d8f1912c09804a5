use crate::depth::{walk_up, ParentSource};
use crate::error::CommentError;
use crate::models::{CommentId, PostId, UserId};

pub const MAX_CONTENT_CHARS: usize = 10_000;

/// A request to create a comment or reply, not yet written.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: PostId,
    pub author_id: UserId,
    pub content: String,
    pub parent_id: Option<CommentId>,
}

impl NewComment {
    /// Trims the content and rejects what can never be stored.
    pub fn normalized(mut self) -> Result<Self, CommentError> {
        let trimmed = self.content.trim();
        if trimmed.is_empty() {
            return Err(CommentError::validation("Comment content must not be empty"));
        }
        if trimmed.chars().count() > MAX_CONTENT_CHARS {
            return Err(CommentError::validation(format!(
                "Comment content exceeds {} characters",
                MAX_CONTENT_CHARS
            )));
        }
        if self.author_id.trim().is_empty() {
            return Err(CommentError::validation("Missing author"));
        }
        if self.parent_id.as_deref().is_some_and(|p| p.trim().is_empty()) {
            self.parent_id = None;
        }
        self.content = trimmed.to_string();
        Ok(self)
    }

    /// Checks the reply target and the depth limit; returns the new comment's depth.
    ///
    /// The parent must exist, be visible and belong to the same post.
    pub async fn check_reply<S>(&self, source: &S, max_depth: usize) -> Result<usize, CommentError>
    where
        S: ParentSource + ?Sized,
    {
        let Some(parent_id) = self.parent_id.as_deref() else {
            return Ok(0);
        };

        let parent = source
            .get_parent(parent_id)
            .await?
            .ok_or_else(|| CommentError::validation(format!("Parent comment '{}' not found", parent_id)))?;

        if parent.is_suspended {
            return Err(CommentError::validation("Cannot reply to a suspended comment"));
        }
        if parent.post_id != self.post_id {
            return Err(CommentError::validation(
                "Parent comment belongs to a different post",
            ));
        }

        // 父评论已读取，从祖父开始计数
        if max_depth <= 1 {
            return Err(CommentError::DepthExceeded { max_depth });
        }
        walk_up(source, parent.parent_id, 1, max_depth).await
    }
}
