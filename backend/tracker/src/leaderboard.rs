use std::hash::Hash;

use indexmap::IndexMap;
use serde::Serialize;

/// Rendered view of the store, both maps ordered by value, highest first.
///
/// Equal values are ordered by key so unchanged state always renders the
/// same bytes. Nothing else about tie order is promised.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Leaderboard {
    #[serde(rename = "PostsToUpvotes")]
    pub posts_to_upvotes: IndexMap<String, i64>,

    #[serde(rename = "UsersToPosts")]
    pub users_to_posts: IndexMap<String, u32>,
}

impl Leaderboard {
    pub fn is_empty(&self) -> bool {
        self.posts_to_upvotes.is_empty() && self.users_to_posts.is_empty()
    }
}

pub fn sort_descending<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> IndexMap<K, V>
where
    K: Ord + Hash,
    V: Ord,
{
    let mut entries: Vec<(K, V)> = entries.into_iter().collect();
    entries.sort_by(|(a_key, a_value), (b_key, b_value)| {
        b_value.cmp(a_value).then_with(|| a_key.cmp(b_key))
    });

    entries.into_iter().collect()
}
