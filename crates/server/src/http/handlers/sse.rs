use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
};
use domain::CommentEvent;
use futures::stream::Stream;
use serde_json::{json, Value};
use tokio_stream::{wrappers::BroadcastStream, StreamExt};

use crate::state::AppState;

pub async fn sse_handler(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let rx = state.events.subscribe();
    tracing::info!("SSE connected: post={}", post_id);

    let stream = BroadcastStream::new(rx).filter_map(move |result| match result {
        Ok(event) if is_for_post(&event, &post_id) => Some(to_sse(event)),
        Ok(_) => None,
        Err(_lagged) => {
            tracing::warn!("SSE client lagged for post {}", post_id);
            None
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(std::time::Duration::from_secs(15)))
}

/// Event name and JSON payload sent to subscribers for one change.
pub(crate) fn event_payload(event: &CommentEvent) -> Result<(&'static str, Value), serde_json::Error> {
    Ok(match event {
        CommentEvent::CommentCreated { comment, .. } => ("new_comment", serde_json::to_value(comment)?),
        CommentEvent::CommentsDeleted { comment_ids, .. } => {
            ("delete_comment", json!({ "ids": comment_ids }))
        }
        CommentEvent::CommentLiked {
            comment_id,
            like_count,
            ..
        } => ("like_comment", json!({ "id": comment_id, "likeCount": like_count })),
    })
}

pub(crate) fn is_for_post(event: &CommentEvent, post_id: &str) -> bool {
    event.post_id() == post_id
}

fn to_sse(event: CommentEvent) -> Result<Event, axum::Error> {
    let (name, data) = event_payload(&event).map_err(|e| {
        tracing::error!("SSE serialization error: {}", e);
        axum::Error::new(e)
    })?;
    Event::default().event(name).json_data(data)
}
