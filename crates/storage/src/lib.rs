use sqlx::{migrate::MigrateDatabase, sqlite::SqlitePoolOptions, Pool, Sqlite};
use std::{fs, path::Path};
use tracing::info;

mod models;
mod repo;

pub use repo::ThreadPage;

// SQLite caps bound parameters per statement; IN-lists are split into chunks of this size.
pub(crate) const BIND_CHUNK: usize = 500;

#[derive(Clone)]
pub struct Db {
    pub(crate) pool: Pool<Sqlite>,
}

impl Db {
    pub async fn new(db_url: &str) -> anyhow::Result<Self> {
        let in_memory = db_url.contains(":memory:");

        if db_url.starts_with("sqlite://") && !in_memory {
            let path_str = db_url.trim_start_matches("sqlite://");
            let path = Path::new(path_str);
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    fs::create_dir_all(parent)?;
                }
            }
        }
        if !in_memory && !Sqlite::database_exists(db_url).await.unwrap_or(false) {
            Sqlite::create_database(db_url).await?;
        }

        // 内存库：每个连接都是独立的空库，只保留一个连接
        let pool = SqlitePoolOptions::new()
            .max_connections(if in_memory { 1 } else { 10 })
            .connect(db_url)
            .await?;

        if !in_memory {
            sqlx::query("PRAGMA journal_mode = WAL;")
                .execute(&pool)
                .await?;
            sqlx::query("PRAGMA synchronous = NORMAL;")
                .execute(&pool)
                .await?;
        }
        sqlx::migrate!("../../migrations").run(&pool).await?;

        info!("Database ready at {}", db_url);
        Ok(Self { pool })
    }

    #[cfg(test)]
    pub(crate) async fn in_memory() -> Self {
        Self::new("sqlite::memory:")
            .await
            .expect("in-memory database should open")
    }
}
