use chrono::Utc;
use domain::LikeRecord;
use sqlx::{QueryBuilder, Sqlite};

use crate::{models::SqlLike, Db, BIND_CHUNK};

impl Db {
    pub async fn likes_for_comments(&self, comment_ids: &[String]) -> anyhow::Result<Vec<LikeRecord>> {
        let mut likes = Vec::new();
        for chunk in comment_ids.chunks(BIND_CHUNK) {
            let mut qb: QueryBuilder<Sqlite> =
                QueryBuilder::new("SELECT comment_id, user_id FROM likes WHERE comment_id IN (");
            let mut ids = qb.separated(", ");
            for id in chunk {
                ids.push_bind(id);
            }
            ids.push_unseparated(")");

            let rows = qb.build_query_as::<SqlLike>().fetch_all(&self.pool).await?;
            likes.extend(rows.into_iter().map(LikeRecord::from));
        }
        Ok(likes)
    }

    /// Flips `user_id`'s like on a comment; returns whether it is now liked and the new count.
    pub async fn toggle_like(&self, comment_id: &str, user_id: &str) -> anyhow::Result<(bool, usize)> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM likes WHERE comment_id = ? AND user_id = ?")
            .bind(comment_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected()
            > 0;

        if !removed {
            sqlx::query("INSERT INTO likes (comment_id, user_id, created_at) VALUES (?, ?, ?)")
                .bind(comment_id)
                .bind(user_id)
                .bind(Utc::now().naive_utc())
                .execute(&mut *tx)
                .await?;
        }

        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM likes WHERE comment_id = ?")
            .bind(comment_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok((!removed, usize::try_from(count).unwrap_or_default()))
    }
}
