use chrono::Utc;
use domain::AuthorProjection;
use sqlx::{QueryBuilder, Sqlite};

use crate::{models::SqlUser, Db, BIND_CHUNK};

impl Db {
    pub async fn upsert_user(
        &self,
        user_id: &str,
        display_name: &str,
        avatar_url: Option<&str>,
    ) -> anyhow::Result<AuthorProjection> {
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO users (id, display_name, avatar_url, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                display_name = excluded.display_name,
                avatar_url = excluded.avatar_url,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(user_id)
        .bind(display_name)
        .bind(avatar_url)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(AuthorProjection {
            id: user_id.to_string(),
            display_name: display_name.to_string(),
            avatar_url: avatar_url.map(str::to_string),
        })
    }

    /// Author projections for the given ids; unknown ids are simply absent.
    pub async fn authors_by_ids(&self, user_ids: &[String]) -> anyhow::Result<Vec<AuthorProjection>> {
        let mut authors = Vec::new();
        for chunk in user_ids.chunks(BIND_CHUNK) {
            let mut qb: QueryBuilder<Sqlite> =
                QueryBuilder::new("SELECT id, display_name, avatar_url FROM users WHERE id IN (");
            let mut ids = qb.separated(", ");
            for id in chunk {
                ids.push_bind(id);
            }
            ids.push_unseparated(")");

            let rows = qb.build_query_as::<SqlUser>().fetch_all(&self.pool).await?;
            authors.extend(rows.into_iter().map(AuthorProjection::from));
        }
        Ok(authors)
    }
}
