use axum::{
    extract::{Path, State},
    Json,
};
use domain::CommentEvent;
use serde::Serialize;

use crate::{
    error::{ApiError, ApiResult},
    http::extract::CurrentUser,
    state::AppState,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub liked: bool,
    pub like_count: usize,
}

pub async fn toggle_like(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(comment_id): Path<String>,
) -> ApiResult<Json<LikeResponse>> {
    let comment = state
        .db
        .get_comment(&comment_id)
        .await?
        .filter(|c| !c.is_suspended)
        .ok_or_else(|| ApiError::NotFound(format!("Comment '{}' not found", comment_id)))?;

    let (liked, like_count) = state.db.toggle_like(&comment.id, &user_id).await?;

    state.publish(CommentEvent::CommentLiked {
        post_id: comment.post_id,
        comment_id: comment.id,
        like_count,
    });

    Ok(Json(LikeResponse { liked, like_count }))
}
