use crate::enrich::{enrich_forest, AuthorIndex, LikeIndex};
use crate::models::{AuthorProjection, CommentNode, CommentRecord, LikeRecord};
use crate::tree::assemble;

/// Turns one storage snapshot (comments, likes, authors) into a presentation-ready forest.
///
/// Every call site that renders comments goes through this, so the suspension,
/// orphan and ordering rules are applied the same way everywhere.
#[derive(Debug, Default)]
pub struct CommentTreeBuilder {
    likes: LikeIndex,
    authors: AuthorIndex,
}

impl CommentTreeBuilder {
    pub fn new(likes: LikeIndex, authors: AuthorIndex) -> Self {
        Self { likes, authors }
    }

    pub fn from_parts<L, A>(likes: L, authors: A) -> Self
    where
        L: IntoIterator<Item = LikeRecord>,
        A: IntoIterator<Item = AuthorProjection>,
    {
        Self::new(likes.into_iter().collect(), authors.into_iter().collect())
    }

    pub fn build<I>(&self, records: I) -> Vec<CommentNode>
    where
        I: IntoIterator<Item = CommentRecord>,
    {
        enrich_forest(assemble(records), &self.likes, &self.authors)
    }
}
