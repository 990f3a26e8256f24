use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
    time::Duration,
};

use tokio::{
    sync::mpsc::Sender,
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tracing::{debug, info, warn};

use crate::{
    Platform,
    models::{Comment, Post},
};

#[derive(Debug, Clone, PartialEq)]
pub enum PlatformEvent {
    NewPosts(Vec<Post>),
    ScoreUpdated(Post),
    NewComments(Vec<Comment>),
}

#[derive(Debug, Clone)]
pub struct MonitorSettings {
    pub subreddit: String,
    pub interval: Duration,
    pub limit: u32,
}

/// Starts the new-post, new-comment and score monitors. `watched` are the
/// posts whose score changes are reported. Each monitor stops once `events`
/// has no receiver.
pub fn spawn_monitors(
    platform: Arc<dyn Platform>,
    settings: MonitorSettings,
    watched: Vec<Post>,
    events: Sender<PlatformEvent>,
) -> Vec<JoinHandle<()>> {
    info!(
        "Monitoring r/{} every {:?} ({} posts watched for score changes)",
        settings.subreddit,
        settings.interval,
        watched.len()
    );

    vec![
        tokio::spawn(watch_new_posts(
            platform.clone(),
            settings.clone(),
            events.clone(),
        )),
        tokio::spawn(watch_new_comments(
            platform.clone(),
            settings.clone(),
            events.clone(),
        )),
        tokio::spawn(watch_scores(platform, settings.interval, watched, events)),
    ]
}

/// IDs already reported. The first batch only primes the set, mirroring a
/// subscription that starts from "now".
#[derive(Default)]
pub(crate) struct SeenIds {
    ids: HashSet<String>,
    primed: bool,
}

impl SeenIds {
    /// Returns the unseen items, oldest first. Listings arrive newest first.
    pub(crate) fn unseen<T>(&mut self, items: Vec<T>, id: impl Fn(&T) -> &str) -> Vec<T> {
        let mut fresh: Vec<T> = items
            .into_iter()
            .filter(|item| self.ids.insert(id(item).to_string()))
            .collect();

        if !self.primed {
            self.primed = true;
            return Vec::new();
        }

        fresh.reverse();
        fresh
    }
}

/// Last observed score per watched post.
pub(crate) struct ScoreWatch {
    scores: HashMap<String, i64>,
}

impl ScoreWatch {
    pub(crate) fn new(posts: &[Post]) -> Self {
        Self {
            scores: posts
                .iter()
                .map(|post| (post.fullname(), post.score))
                .collect(),
        }
    }

    pub(crate) fn fullnames(&self) -> Vec<String> {
        let mut names: Vec<String> = self.scores.keys().cloned().collect();
        names.sort();
        names
    }

    pub(crate) fn changed(&mut self, posts: Vec<Post>) -> Vec<Post> {
        posts
            .into_iter()
            .filter(|post| {
                match self.scores.insert(post.fullname(), post.score) {
                    Some(previous) => previous != post.score,
                    None => true,
                }
            })
            .collect()
    }
}

fn ticker(period: Duration) -> tokio::time::Interval {
    let mut timer = interval(period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
    timer
}

async fn watch_new_posts(
    platform: Arc<dyn Platform>,
    settings: MonitorSettings,
    events: Sender<PlatformEvent>,
) {
    let mut seen = SeenIds::default();
    let mut timer = ticker(settings.interval);

    loop {
        timer.tick().await;
        if events.is_closed() {
            break;
        }

        match platform.new_posts(&settings.subreddit, settings.limit).await {
            Ok(posts) => {
                let fresh = seen.unseen(posts, |post| post.id.as_str());
                if fresh.is_empty() {
                    continue;
                }

                debug!("{} new posts in r/{}", fresh.len(), settings.subreddit);
                if events.send(PlatformEvent::NewPosts(fresh)).await.is_err() {
                    break;
                }
            }
            Err(e) => warn!("New post monitor fetch failed: {e}"),
        }
    }

    debug!("New post monitor stopped");
}

async fn watch_new_comments(
    platform: Arc<dyn Platform>,
    settings: MonitorSettings,
    events: Sender<PlatformEvent>,
) {
    let mut seen = SeenIds::default();
    let mut timer = ticker(settings.interval);

    loop {
        timer.tick().await;
        if events.is_closed() {
            break;
        }

        match platform
            .new_comments(&settings.subreddit, settings.limit)
            .await
        {
            Ok(comments) => {
                let fresh = seen.unseen(comments, |comment| comment.id.as_str());
                if fresh.is_empty() {
                    continue;
                }

                if events.send(PlatformEvent::NewComments(fresh)).await.is_err() {
                    break;
                }
            }
            Err(e) => warn!("Comment monitor fetch failed: {e}"),
        }
    }

    debug!("Comment monitor stopped");
}

async fn watch_scores(
    platform: Arc<dyn Platform>,
    period: Duration,
    watched: Vec<Post>,
    events: Sender<PlatformEvent>,
) {
    let mut scores = ScoreWatch::new(&watched);
    let fullnames = scores.fullnames();

    if fullnames.is_empty() {
        debug!("No posts to watch for score changes");
        return;
    }

    let mut timer = ticker(period);

    'watch: loop {
        timer.tick().await;
        if events.is_closed() {
            break 'watch;
        }

        let posts = match platform.posts_by_id(&fullnames).await {
            Ok(posts) => posts,
            Err(e) => {
                warn!("Score monitor fetch failed: {e}");
                continue;
            }
        };

        for post in scores.changed(posts) {
            if events.send(PlatformEvent::ScoreUpdated(post)).await.is_err() {
                break 'watch;
            }
        }
    }

    debug!("Score monitor stopped");
}
