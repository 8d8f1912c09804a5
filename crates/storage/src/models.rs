use chrono::NaiveDateTime;
use domain::{AuthorProjection, CommentRecord, LikeRecord, Post};
use sqlx::FromRow;
use std::collections::BTreeSet;

#[derive(FromRow)]
pub struct SqlComment {
    pub id: String,
    pub post_id: String,
    pub parent_id: Option<String>,
    pub author_id: String,
    pub content: String,
    pub created_at: NaiveDateTime,
    pub is_suspended: bool,
}

impl From<SqlComment> for CommentRecord {
    fn from(sql: SqlComment) -> Self {
        CommentRecord {
            id: sql.id,
            post_id: sql.post_id,
            parent_id: sql.parent_id,
            author_id: sql.author_id,
            content: sql.content,
            created_at: sql.created_at,
            is_suspended: sql.is_suspended,
            like_refs: BTreeSet::new(),
        }
    }
}

#[derive(FromRow)]
pub struct SqlLike {
    pub comment_id: String,
    pub user_id: String,
}

impl From<SqlLike> for LikeRecord {
    fn from(sql: SqlLike) -> Self {
        LikeRecord {
            comment_id: sql.comment_id,
            user_id: sql.user_id,
        }
    }
}

#[derive(FromRow)]
pub struct SqlUser {
    pub id: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

impl From<SqlUser> for AuthorProjection {
    fn from(sql: SqlUser) -> Self {
        AuthorProjection {
            id: sql.id,
            display_name: sql.display_name,
            avatar_url: sql.avatar_url,
        }
    }
}

#[derive(FromRow)]
pub struct SqlPost {
    pub id: String,
    pub author_id: String,
    pub title: String,
    pub body: String,
    pub created_at: NaiveDateTime,
}

impl From<SqlPost> for Post {
    fn from(sql: SqlPost) -> Self {
        Post {
            id: sql.id,
            author_id: sql.author_id,
            title: sql.title,
            body: sql.body,
            created_at: sql.created_at,
        }
    }
}
