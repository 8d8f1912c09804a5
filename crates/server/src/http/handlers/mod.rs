pub mod admin;
pub mod comments;
pub mod likes;
pub mod posts;
pub mod sse;
pub mod users;

use domain::CommentNode;
use serde::{Deserialize, Serialize};

use crate::config::CommentSettings;

pub(crate) fn new_id() -> String {
    format!("{:x}", rand::random::<u128>())
}

#[derive(Deserialize, Default)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl PageQuery {
    /// 1-based page and a page size clamped to the configured bounds.
    pub fn resolve(&self, settings: &CommentSettings) -> (u32, u32) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self
            .per_page
            .unwrap_or(settings.page_size)
            .clamp(1, settings.max_page_size.max(1));
        (page, per_page)
    }

    pub fn limit_offset(&self, settings: &CommentSettings) -> (i64, i64) {
        let (page, per_page) = self.resolve(settings);
        let limit = i64::from(per_page);
        (limit, i64::from(page - 1) * limit)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentPage {
    pub comments: Vec<CommentNode>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_query_clamps() {
        let settings = CommentSettings::default();

        let q = PageQuery {
            page: Some(0),
            per_page: Some(10_000),
        };
        assert_eq!(q.resolve(&settings), (1, 100));

        let q = PageQuery {
            page: Some(3),
            per_page: Some(10),
        };
        assert_eq!(q.limit_offset(&settings), (10, 20));

        assert_eq!(PageQuery::default().resolve(&settings), (1, 20));
    }
}
