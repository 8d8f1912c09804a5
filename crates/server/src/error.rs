use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use domain::CommentError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Missing or empty X-User-Id header")]
    Unauthorized,
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<CommentError> for ApiError {
    fn from(err: CommentError) -> Self {
        match err {
            CommentError::Validation(msg) => ApiError::BadRequest(msg),
            e @ CommentError::DepthExceeded { .. } => ApiError::BadRequest(e.to_string()),
            e @ CommentError::PostNotFound(_) => ApiError::NotFound(e.to_string()),
            CommentError::Storage(e) => ApiError::Internal(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(e) => {
                tracing::error!("Request failed: {:?}", e);
                return (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
                    .into_response();
            }
        };
        (status, self.to_string()).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
