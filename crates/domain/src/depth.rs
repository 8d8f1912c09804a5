use async_trait::async_trait;
use tracing::debug;

use crate::error::CommentError;
use crate::models::CommentRecord;

pub const DEFAULT_MAX_DEPTH: usize = 5;

/// Single-record lookup used while walking a reply chain upward.
#[async_trait]
pub trait ParentSource: Send + Sync {
    async fn get_parent(&self, id: &str) -> anyhow::Result<Option<CommentRecord>>;
}

/// Counts the ancestors a new reply under `parent_id` would have.
///
/// Fails with [`CommentError::DepthExceeded`] once that count reaches `max_depth`.
/// Each hop is one sequential fetch, so the walk costs at most `max_depth` reads and
/// stops on corrupted cyclic chains too. A chain ending at a missing record is
/// treated as ending there.
pub async fn check_depth<S>(
    source: &S,
    parent_id: Option<&str>,
    max_depth: usize,
) -> Result<usize, CommentError>
where
    S: ParentSource + ?Sized,
{
    walk_up(source, parent_id.map(str::to_string), 0, max_depth).await
}

/// Continues a depth walk whose first `depth` ancestors were already fetched.
pub(crate) async fn walk_up<S>(
    source: &S,
    mut cursor: Option<String>,
    mut depth: usize,
    max_depth: usize,
) -> Result<usize, CommentError>
where
    S: ParentSource + ?Sized,
{
    while let Some(id) = cursor {
        let Some(record) = source.get_parent(&id).await? else {
            debug!(comment_id = %id, "Reply chain ends at a missing comment");
            break;
        };
        depth += 1;
        if depth >= max_depth {
            return Err(CommentError::DepthExceeded { max_depth });
        }
        cursor = record.parent_id;
    }

    Ok(depth)
}
