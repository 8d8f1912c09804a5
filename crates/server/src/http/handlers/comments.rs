use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use domain::{CommentError, CommentEvent, CommentNode, NewComment};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{new_id, CommentPage, PageQuery};
use crate::{
    error::{ApiError, ApiResult},
    http::extract::{is_admin, CurrentUser},
    state::AppState,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub content: String,
    pub parent_id: Option<String>,
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub deleted: Vec<String>,
}

pub async fn list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<CommentPage>> {
    if state.db.get_post(&post_id).await?.is_none() {
        return Err(CommentError::PostNotFound(post_id).into());
    }

    let (page, per_page) = query.resolve(&state.comments);
    let (limit, offset) = query.limit_offset(&state.comments);

    let thread_page = state.db.list_thread_page(&post_id, limit, offset).await?;
    let comments = state.db.build_forest(thread_page.records).await?;

    Ok(Json(CommentPage {
        comments,
        total: thread_page.total,
        page,
        per_page,
    }))
}

pub async fn create_comment(
    State(state): State<AppState>,
    CurrentUser(author_id): CurrentUser,
    Path(post_id): Path<String>,
    Json(payload): Json<CreateCommentRequest>,
) -> ApiResult<(StatusCode, Json<CommentNode>)> {
    let new_comment = NewComment {
        post_id,
        author_id,
        content: payload.content,
        parent_id: payload.parent_id,
    }
    .normalized()?;

    if state.db.get_post(&new_comment.post_id).await?.is_none() {
        return Err(CommentError::PostNotFound(new_comment.post_id).into());
    }
    let depth = new_comment
        .check_reply(&state.db, state.comments.max_depth)
        .await?;

    let record = state
        .db
        .insert_comment(&new_id(), &new_comment, Utc::now().naive_utc())
        .await?;
    info!(
        "Comment created: {} on post {} (depth {})",
        record.id, record.post_id, depth
    );

    let comment = state
        .db
        .build_forest(vec![record])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("New comment vanished from its tree")))?;

    state.publish(CommentEvent::CommentCreated {
        post_id: comment.post_id.clone(),
        comment: comment.clone(),
    });

    Ok((StatusCode::CREATED, Json(comment)))
}

/// Removes a comment and every reply under it. Allowed for its author and for admins.
pub async fn delete_comment(
    State(state): State<AppState>,
    headers: HeaderMap,
    caller: Option<CurrentUser>,
    Path(comment_id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    let comment = state
        .db
        .get_comment(&comment_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Comment '{}' not found", comment_id)))?;

    let is_author = caller.is_some_and(|CurrentUser(id)| id == comment.author_id);
    if !is_author && !is_admin(&headers, &state.admin_token) {
        return Err(ApiError::Forbidden("Only the author or an admin may delete this comment".into()));
    }

    let deleted = state.db.delete_comment_subtree(&comment.id).await?;
    state.publish(CommentEvent::CommentsDeleted {
        post_id: comment.post_id,
        comment_ids: deleted.clone(),
    });

    Ok(Json(DeleteResponse { deleted }))
}
