use domain::CommentEvent;
use storage::Db;
use tokio::sync::broadcast;

use crate::config::CommentSettings;

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    // 评论变更广播，供 SSE 订阅
    pub events: broadcast::Sender<CommentEvent>,
    pub admin_token: String,
    pub comments: CommentSettings,
}

impl AppState {
    /// Fire-and-forget: having no live subscribers is not an error.
    pub fn publish(&self, event: CommentEvent) {
        let _ = self.events.send(event);
    }
}
