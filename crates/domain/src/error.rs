use thiserror::Error;

use crate::models::PostId;

#[derive(Debug, Error)]
pub enum CommentError {
    #[error("{0}")]
    Validation(String),
    #[error("post '{0}' not found")]
    PostNotFound(PostId),
    #[error("reply chain would exceed the maximum depth of {max_depth}")]
    DepthExceeded { max_depth: usize },
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl CommentError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
