use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDateTime;
use domain::{CommentEvent, CommentRecord};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{CommentPage, PageQuery};
use crate::{
    error::{ApiError, ApiResult},
    http::extract::AdminAuth,
    state::AppState,
};

const SUSPENDED_LIST_LIMIT: i64 = 200;

#[derive(Deserialize)]
pub struct SuspendRequest {
    pub suspended: bool,
}

#[derive(Serialize)]
pub struct SuspendResponse {
    pub id: String,
    pub suspended: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuspendedComment {
    pub id: String,
    pub post_id: String,
    pub parent_id: Option<String>,
    pub author_id: String,
    pub content: String,
    pub created_at: NaiveDateTime,
}

impl From<CommentRecord> for SuspendedComment {
    fn from(r: CommentRecord) -> Self {
        Self {
            id: r.id,
            post_id: r.post_id,
            parent_id: r.parent_id,
            author_id: r.author_id,
            content: r.content,
            created_at: r.created_at,
        }
    }
}

/// Moderation view: the newest comments across all posts, threaded within the page.
pub async fn list_comments(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<CommentPage>> {
    let (page, per_page) = query.resolve(&state.comments);
    let (limit, offset) = query.limit_offset(&state.comments);

    let (records, total) = state.db.list_recent_comments(limit, offset).await?;
    let comments = state.db.build_forest(records).await?;

    Ok(Json(CommentPage {
        comments,
        total,
        page,
        per_page,
    }))
}

pub async fn list_suspended(
    _admin: AdminAuth,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<SuspendedComment>>> {
    let records = state.db.list_suspended_comments(SUSPENDED_LIST_LIMIT).await?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}

pub async fn set_suspended(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
    Json(payload): Json<SuspendRequest>,
) -> ApiResult<Json<SuspendResponse>> {
    let comment = state
        .db
        .get_comment(&comment_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Comment '{}' not found", comment_id)))?;

    if !state
        .db
        .set_comment_suspended(&comment_id, payload.suspended)
        .await?
    {
        return Err(ApiError::NotFound(format!("Comment '{}' not found", comment_id)));
    }

    // 挂起后通知在线客户端移除该评论
    if payload.suspended && !comment.is_suspended {
        state.publish(CommentEvent::CommentsDeleted {
            post_id: comment.post_id,
            comment_ids: vec![comment_id.clone()],
        });
    }

    info!("Comment {} suspended={}", comment_id, payload.suspended);
    Ok(Json(SuspendResponse {
        id: comment_id,
        suspended: payload.suspended,
    }))
}
