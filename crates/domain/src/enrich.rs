use std::collections::{HashMap, HashSet};

use crate::models::{AuthorProjection, CommentId, CommentNode, LikeRecord, UserId};

/// Likers per comment, built from like records.
#[derive(Debug, Clone, Default)]
pub struct LikeIndex(HashMap<CommentId, HashSet<UserId>>);

impl LikeIndex {
    pub fn count(&self, comment_id: &str) -> usize {
        self.0.get(comment_id).map_or(0, HashSet::len)
    }
}

impl FromIterator<LikeRecord> for LikeIndex {
    fn from_iter<T: IntoIterator<Item = LikeRecord>>(iter: T) -> Self {
        let mut map: HashMap<CommentId, HashSet<UserId>> = HashMap::new();
        for like in iter {
            map.entry(like.comment_id).or_default().insert(like.user_id);
        }
        Self(map)
    }
}

#[derive(Debug, Clone, Default)]
pub struct AuthorIndex(HashMap<UserId, AuthorProjection>);

impl AuthorIndex {
    /// Resolved author, or the "Unknown" placeholder when the profile is gone.
    pub fn resolve(&self, author_id: &str) -> AuthorProjection {
        self.0
            .get(author_id)
            .cloned()
            .unwrap_or_else(|| AuthorProjection::placeholder(author_id))
    }
}

impl FromIterator<AuthorProjection> for AuthorIndex {
    fn from_iter<T: IntoIterator<Item = AuthorProjection>>(iter: T) -> Self {
        Self(iter.into_iter().map(|a| (a.id.clone(), a)).collect())
    }
}

/// Recomputes `like_count` and `author` for one node and its whole subtree.
pub fn enrich(mut node: CommentNode, likes: &LikeIndex, authors: &AuthorIndex) -> CommentNode {
    enrich_in_place(&mut node, likes, authors);
    node
}

pub fn enrich_forest(
    forest: Vec<CommentNode>,
    likes: &LikeIndex,
    authors: &AuthorIndex,
) -> Vec<CommentNode> {
    forest
        .into_iter()
        .map(|node| enrich(node, likes, authors))
        .collect()
}

fn enrich_in_place(root: &mut CommentNode, likes: &LikeIndex, authors: &AuthorIndex) {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        node.like_count = likes.count(&node.id);
        node.author = authors.resolve(&node.author.id);
        stack.extend(node.replies.iter_mut());
    }
}
