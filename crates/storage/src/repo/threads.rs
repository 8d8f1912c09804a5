use domain::{CommentNode, CommentRecord, CommentTreeBuilder, LikeRecord, PostId};
use std::collections::{BTreeSet, HashMap};

use crate::Db;

impl Db {
    /// Joins author profiles onto already-fetched records and threads them as one set.
    ///
    /// Likes are taken from the records' own `like_refs`, so this costs one extra query.
    pub async fn build_forest(&self, records: Vec<CommentRecord>) -> anyhow::Result<Vec<CommentNode>> {
        let builder = self.tree_builder_for(&records).await?;
        Ok(builder.build(records))
    }

    /// Like [`Db::build_forest`], but threads each post's comments separately.
    pub async fn build_forests_by_post(
        &self,
        records: Vec<CommentRecord>,
    ) -> anyhow::Result<HashMap<PostId, Vec<CommentNode>>> {
        let builder = self.tree_builder_for(&records).await?;

        let mut by_post: HashMap<PostId, Vec<CommentRecord>> = HashMap::new();
        for record in records {
            by_post.entry(record.post_id.clone()).or_default().push(record);
        }

        Ok(by_post
            .into_iter()
            .map(|(post_id, records)| (post_id, builder.build(records)))
            .collect())
    }

    async fn tree_builder_for(&self, records: &[CommentRecord]) -> anyhow::Result<CommentTreeBuilder> {
        let author_ids: Vec<String> = records
            .iter()
            .map(|r| r.author_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let authors = self.authors_by_ids(&author_ids).await?;

        let likes: Vec<LikeRecord> = records
            .iter()
            .flat_map(|r| {
                r.like_refs.iter().map(|user_id| LikeRecord {
                    comment_id: r.id.clone(),
                    user_id: user_id.clone(),
                })
            })
            .collect();

        Ok(CommentTreeBuilder::from_parts(likes, authors))
    }
}
