use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use domain::{CommentNode, Post};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::new_id;
use crate::{
    error::{ApiError, ApiResult},
    http::extract::CurrentUser,
    state::AppState,
};

#[derive(Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub body: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetail {
    #[serde(flatten)]
    pub post: Post,
    pub comments: Vec<CommentNode>,
}

pub async fn create_post(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(payload): Json<CreatePostRequest>,
) -> ApiResult<(StatusCode, Json<Post>)> {
    let title = payload.title.trim();
    if title.is_empty() {
        return Err(ApiError::BadRequest("Post title must not be empty".into()));
    }

    let post = Post {
        id: new_id(),
        author_id: user_id,
        title: title.to_string(),
        body: payload.body,
        created_at: Utc::now().naive_utc(),
    };
    state.db.insert_post(&post).await?;

    info!("Post created: {} by {}", post.id, post.author_id);
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> ApiResult<Json<PostDetail>> {
    let post = state
        .db
        .get_post(&post_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Post '{}' not found", post_id)))?;

    let records = state.db.list_post_comments(&post.id).await?;
    let comments = state.db.build_forest(records).await?;

    Ok(Json(PostDetail { post, comments }))
}
