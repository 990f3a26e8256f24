use std::collections::{HashMap, HashSet, hash_map::Entry};

use reddit::Post;

use crate::leaderboard::{Leaderboard, sort_descending};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaselineEntry {
    pub title: String,
    pub upvotes: i64,
}

/// In-memory aggregation state, keyed by post ID. Lives for the whole
/// process; nothing is evicted.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    baseline: HashMap<String, BaselineEntry>,
    authors: HashMap<String, u32>,
    /// Posts already counted toward their author.
    observed: HashSet<String>,
    deltas: HashMap<String, i64>,
    comments: HashMap<String, String>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts the post toward its author the first time its ID is seen.
    pub fn observe(&mut self, post: &Post) -> bool {
        if !self.observed.insert(post.id.clone()) {
            return false;
        }

        *self.authors.entry(post.author.clone()).or_insert(0) += 1;
        true
    }

    /// Baselines the initial top listing. Returns how many posts were new.
    pub fn seed(&mut self, posts: &[Post]) -> usize {
        let mut seeded = 0;

        for post in posts {
            if self.insert_baseline(post) {
                self.observe(post);
                seeded += 1;
            }
        }

        seeded
    }

    fn insert_baseline(&mut self, post: &Post) -> bool {
        match self.baseline.entry(post.id.clone()) {
            Entry::Vacant(entry) => {
                entry.insert(BaselineEntry {
                    title: post.title.clone(),
                    upvotes: post.ups,
                });
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// Rebuilds the delta map from a fresh top listing. Posts seen for the
    /// first time are baselined and contribute nothing this cycle.
    pub fn apply_listing(&mut self, posts: &[Post]) -> Leaderboard {
        let mut deltas = HashMap::new();

        for post in posts {
            match self.baseline.get(&post.id) {
                Some(entry) => {
                    let gain = post.ups - entry.upvotes;
                    if gain > 0 {
                        deltas.insert(post.id.clone(), gain);
                    }
                }
                None => {
                    self.insert_baseline(post);
                }
            }

            self.observe(post);
        }

        self.deltas = deltas;
        self.leaderboard()
    }

    /// A failed poll leaves the cycle with no deltas.
    pub fn reset_deltas(&mut self) {
        self.deltas.clear();
    }

    /// Overwrites the baseline with the latest absolute score.
    pub fn record_score(&mut self, post: &Post) {
        match self.baseline.entry(post.id.clone()) {
            Entry::Vacant(entry) => {
                entry.insert(BaselineEntry {
                    title: post.title.clone(),
                    upvotes: post.score,
                });
            }
            Entry::Occupied(mut entry) => {
                let entry = entry.get_mut();
                entry.upvotes = post.score;
                if entry.title.is_empty() {
                    entry.title = post.title.clone();
                }
            }
        }
    }

    /// Keeps only the first comment seen per post. Returns whether it was kept.
    pub fn record_comment(&mut self, post_id: &str, body: &str) -> bool {
        match self.comments.entry(post_id.to_string()) {
            Entry::Vacant(entry) => {
                entry.insert(body.to_string());
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    pub fn baseline(&self, post_id: &str) -> Option<&BaselineEntry> {
        self.baseline.get(post_id)
    }

    pub fn first_comment(&self, post_id: &str) -> Option<&str> {
        self.comments.get(post_id).map(String::as_str)
    }

    pub fn author_count(&self, author: &str) -> u32 {
        self.authors.get(author).copied().unwrap_or(0)
    }

    /// Renders deltas by title. A title already taken by a higher-ranked
    /// post is suffixed with the post ID.
    pub fn leaderboard(&self) -> Leaderboard {
        let mut ranked: Vec<(&str, &str, i64)> = self
            .deltas
            .iter()
            .map(|(id, gain)| {
                let title = self
                    .baseline
                    .get(id)
                    .map(|entry| entry.title.as_str())
                    .unwrap_or(id.as_str());
                (title, id.as_str(), *gain)
            })
            .collect();
        ranked.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| (a.0, a.1).cmp(&(b.0, b.1))));

        let mut titles = HashSet::new();
        let posts = ranked.into_iter().map(|(title, id, gain)| {
            if titles.insert(title) {
                (title.to_string(), gain)
            } else {
                (format!("{title} [{id}]"), gain)
            }
        });

        Leaderboard {
            posts_to_upvotes: sort_descending(posts),
            users_to_posts: sort_descending(
                self.authors
                    .iter()
                    .map(|(author, count)| (author.clone(), *count)),
            ),
        }
    }
}
