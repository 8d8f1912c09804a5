use async_trait::async_trait;
use chrono::NaiveDateTime;
use domain::{CommentId, CommentRecord, NewComment, ParentSource};
use sqlx::{QueryBuilder, Sqlite};
use std::collections::HashMap;
use tracing::info;

use crate::{models::SqlComment, Db, BIND_CHUNK};

const COMMENT_COLUMNS: &str =
    "c.id, c.post_id, c.parent_id, c.author_id, c.content, c.created_at, c.is_suspended";

/// Records of one page of threads plus the number of thread roots in the post.
pub struct ThreadPage {
    pub records: Vec<CommentRecord>,
    pub total: i64,
}

impl Db {
    pub async fn insert_comment(
        &self,
        id: &str,
        c: &NewComment,
        created_at: NaiveDateTime,
    ) -> anyhow::Result<CommentRecord> {
        sqlx::query(
            r#"
            INSERT INTO comments (id, post_id, parent_id, author_id, content, created_at, is_suspended)
            VALUES (?, ?, ?, ?, ?, ?, FALSE)
            "#,
        )
        .bind(id)
        .bind(&c.post_id)
        .bind(&c.parent_id)
        .bind(&c.author_id)
        .bind(&c.content)
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        Ok(CommentRecord {
            id: id.to_string(),
            post_id: c.post_id.clone(),
            parent_id: c.parent_id.clone(),
            author_id: c.author_id.clone(),
            content: c.content.clone(),
            created_at,
            is_suspended: false,
            like_refs: Default::default(),
        })
    }

    /// Fetches one comment without its likes.
    pub async fn get_comment(&self, comment_id: &str) -> anyhow::Result<Option<CommentRecord>> {
        let row = sqlx::query_as::<_, SqlComment>(&format!(
            "SELECT {} FROM comments c WHERE c.id = ?",
            COMMENT_COLUMNS
        ))
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Every visible comment of a post, likes attached.
    pub async fn list_post_comments(&self, post_id: &str) -> anyhow::Result<Vec<CommentRecord>> {
        self.list_comments_for_posts(&[post_id.to_string()]).await
    }

    pub async fn list_comments_for_posts(
        &self,
        post_ids: &[String],
    ) -> anyhow::Result<Vec<CommentRecord>> {
        let mut rows = Vec::new();
        for chunk in post_ids.chunks(BIND_CHUNK) {
            let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
                "SELECT {} FROM comments c WHERE c.is_suspended = FALSE AND c.post_id IN (",
                COMMENT_COLUMNS
            ));
            let mut ids = qb.separated(", ");
            for id in chunk {
                ids.push_bind(id);
            }
            ids.push_unseparated(")");

            rows.extend(
                qb.build_query_as::<SqlComment>()
                    .fetch_all(&self.pool)
                    .await?,
            );
        }

        self.with_likes(rows).await
    }

    /// One page of whole threads for a post.
    ///
    /// Thread roots are comments with no parent, a self parent or a parent missing from
    /// the post; each page carries its roots and their full descendant closure, so a
    /// thread is never split across pages. Suspended comments are walked through but not
    /// returned.
    pub async fn list_thread_page(
        &self,
        post_id: &str,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<ThreadPage> {
        let rows = sqlx::query_as::<_, SqlComment>(&format!(
            r#"
            WITH RECURSIVE
            roots(id) AS (
                SELECT c.id FROM comments c
                WHERE c.post_id = ? AND {}
                ORDER BY c.created_at DESC, c.id ASC
                LIMIT ? OFFSET ?
            ),
            thread(id) AS (
                SELECT id FROM roots
                UNION
                SELECT c.id FROM comments c
                JOIN thread t ON c.parent_id = t.id
                WHERE c.post_id = ?
            )
            SELECT {} FROM comments c
            WHERE c.id IN (SELECT id FROM thread) AND c.is_suspended = FALSE
            "#,
            THREAD_ROOT_FILTER, COMMENT_COLUMNS
        ))
        .bind(post_id)
        .bind(limit)
        .bind(offset)
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM comments c WHERE c.post_id = ? AND {}",
            THREAD_ROOT_FILTER
        ))
        .bind(post_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(ThreadPage {
            records: self.with_likes(rows).await?,
            total,
        })
    }

    /// Newest visible comments across every post, for moderation.
    pub async fn list_recent_comments(
        &self,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<(Vec<CommentRecord>, i64)> {
        let rows = sqlx::query_as::<_, SqlComment>(&format!(
            r#"
            SELECT {} FROM comments c
            WHERE c.is_suspended = FALSE
            ORDER BY c.created_at DESC, c.id ASC
            LIMIT ? OFFSET ?
            "#,
            COMMENT_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM comments WHERE is_suspended = FALSE",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok((self.with_likes(rows).await?, count))
    }

    pub async fn list_suspended_comments(&self, limit: i64) -> anyhow::Result<Vec<CommentRecord>> {
        let rows = sqlx::query_as::<_, SqlComment>(&format!(
            r#"
            SELECT {} FROM comments c
            WHERE c.is_suspended = TRUE
            ORDER BY c.created_at DESC, c.id ASC
            LIMIT ?
            "#,
            COMMENT_COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Returns `false` when no such comment exists.
    pub async fn set_comment_suspended(&self, id: &str, suspended: bool) -> anyhow::Result<bool> {
        let result = sqlx::query("UPDATE comments SET is_suspended = ? WHERE id = ?")
            .bind(suspended)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a comment, all of its descendants and their likes.
    ///
    /// The descendant closure is read with one recursive query and removed with one bulk
    /// delete per table, inside a single transaction. Returns the deleted ids.
    pub async fn delete_comment_subtree(&self, id: &str) -> anyhow::Result<Vec<CommentId>> {
        let mut tx = self.pool.begin().await?;

        let ids = sqlx::query_scalar::<_, String>(
            r#"
            WITH RECURSIVE subtree(id) AS (
                SELECT id FROM comments WHERE id = ?
                UNION
                SELECT c.id FROM comments c JOIN subtree s ON c.parent_id = s.id
            )
            SELECT id FROM subtree
            "#,
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        for chunk in ids.chunks(BIND_CHUNK) {
            for (table, column) in [("likes", "comment_id"), ("comments", "id")] {
                let mut qb: QueryBuilder<Sqlite> =
                    QueryBuilder::new(format!("DELETE FROM {} WHERE {} IN (", table, column));
                let mut list = qb.separated(", ");
                for comment_id in chunk {
                    list.push_bind(comment_id);
                }
                list.push_unseparated(")");
                qb.build().execute(&mut *tx).await?;
            }
        }

        tx.commit().await?;

        if !ids.is_empty() {
            info!("Deleted comment {} with {} descendant(s)", id, ids.len() - 1);
        }
        Ok(ids)
    }

    async fn with_likes(&self, rows: Vec<SqlComment>) -> anyhow::Result<Vec<CommentRecord>> {
        let mut records: Vec<CommentRecord> = rows.into_iter().map(Into::into).collect();
        let ids: Vec<String> = records.iter().map(|r| r.id.clone()).collect();

        let mut likes: HashMap<String, Vec<String>> = HashMap::new();
        for like in self.likes_for_comments(&ids).await? {
            likes.entry(like.comment_id).or_default().push(like.user_id);
        }

        for record in records.iter_mut() {
            if let Some(users) = likes.remove(&record.id) {
                record.like_refs.extend(users);
            }
        }
        Ok(records)
    }
}

const THREAD_ROOT_FILTER: &str = r#"(
    c.parent_id IS NULL
    OR c.parent_id = c.id
    OR NOT EXISTS (
        SELECT 1 FROM comments p WHERE p.id = c.parent_id AND p.post_id = c.post_id
    )
)"#;

#[async_trait]
impl ParentSource for Db {
    async fn get_parent(&self, id: &str) -> anyhow::Result<Option<CommentRecord>> {
        self.get_comment(id).await
    }
}
