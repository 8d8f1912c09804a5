use domain::Post;

use crate::{models::SqlPost, Db};

impl Db {
    pub async fn insert_post(&self, post: &Post) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO posts (id, author_id, title, body, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&post.id)
        .bind(&post.author_id)
        .bind(&post.title)
        .bind(&post.body)
        .bind(post.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get_post(&self, post_id: &str) -> anyhow::Result<Option<Post>> {
        let row = sqlx::query_as::<_, SqlPost>(
            "SELECT id, author_id, title, body, created_at FROM posts WHERE id = ?",
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    pub async fn list_posts_by_author(&self, author_id: &str) -> anyhow::Result<Vec<Post>> {
        let rows = sqlx::query_as::<_, SqlPost>(
            r#"
            SELECT id, author_id, title, body, created_at
            FROM posts
            WHERE author_id = ?
            ORDER BY created_at DESC, id ASC
            "#,
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
