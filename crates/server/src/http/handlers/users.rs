use axum::{
    extract::{Path, State},
    Json,
};
use domain::AuthorProjection;
use serde::Deserialize;

use super::posts::PostDetail;
use crate::{
    error::{ApiError, ApiResult},
    http::extract::CurrentUser,
    state::AppState,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    pub display_name: String,
    pub avatar_url: Option<String>,
}

pub async fn upsert_profile(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(user_id): Path<String>,
    Json(payload): Json<ProfileRequest>,
) -> ApiResult<Json<AuthorProjection>> {
    if caller != user_id {
        return Err(ApiError::Forbidden("Cannot edit another user's profile".into()));
    }
    let display_name = payload.display_name.trim();
    if display_name.is_empty() {
        return Err(ApiError::BadRequest("Display name must not be empty".into()));
    }

    let author = state
        .db
        .upsert_user(&user_id, display_name, payload.avatar_url.as_deref())
        .await?;
    Ok(Json(author))
}

/// Profile page: the user's posts, newest first, each with its comment tree.
pub async fn list_user_posts(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<PostDetail>>> {
    let posts = state.db.list_posts_by_author(&user_id).await?;
    let post_ids: Vec<String> = posts.iter().map(|p| p.id.clone()).collect();

    let records = state.db.list_comments_for_posts(&post_ids).await?;
    let mut forests = state.db.build_forests_by_post(records).await?;

    let details = posts
        .into_iter()
        .map(|post| {
            let comments = forests.remove(&post.id).unwrap_or_default();
            PostDetail { post, comments }
        })
        .collect();

    Ok(Json(details))
}
