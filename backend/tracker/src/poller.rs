use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use reddit::{Platform, TimeWindow};
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{error, info, warn};

use crate::{leaderboard::Leaderboard, tracker::TrackerHandle};

pub const TOP_LIMIT: u32 = 25;
pub const POLL_INTERVAL: Duration = Duration::from_secs(45);

/// Re-fetches the day's top listing and folds it into the tracker.
pub struct Poller {
    platform: Arc<dyn Platform>,
    tracker: TrackerHandle,
    subreddit: String,
    limit: u32,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when the poll ends, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Poller {
    pub fn new(platform: Arc<dyn Platform>, tracker: TrackerHandle, subreddit: &str) -> Self {
        Self {
            platform,
            tracker,
            subreddit: subreddit.to_string(),
            limit: TOP_LIMIT,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn is_polling(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn begin(&self) -> Option<InFlight<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight(&self.in_flight))
    }

    /// Runs one poll cycle. Returns `None` if another cycle is still running.
    /// Failures are logged and yield an empty leaderboard.
    pub async fn poll_once(&self) -> Option<Leaderboard> {
        let Some(_in_flight) = self.begin() else {
            warn!("Previous poll of r/{} still running, skipping", self.subreddit);
            return None;
        };

        let posts = match self
            .platform
            .top_posts(&self.subreddit, TimeWindow::Day, self.limit)
            .await
        {
            Ok(posts) => posts,
            Err(e) => {
                error!("Error in Reddit polling: {e}");
                if let Err(e) = self.tracker.poll_failed().await {
                    error!("Could not record failed poll: {e}");
                }
                return Some(Leaderboard::default());
            }
        };

        let fetched = posts.len();
        match self.tracker.apply_listing(posts).await {
            Ok(leaderboard) => {
                info!(
                    "Polled r/{}: {fetched} top posts, {} gaining, {} authors",
                    self.subreddit,
                    leaderboard.posts_to_upvotes.len(),
                    leaderboard.users_to_posts.len()
                );
                Some(leaderboard)
            }
            Err(e) => {
                error!("Error in Reddit polling: {e}");
                Some(Leaderboard::default())
            }
        }
    }

    /// Polls every `period`, first tick one period from now. Missed ticks are
    /// skipped. Runs until the tracker stops.
    pub async fn run(self: Arc<Self>, period: Duration) {
        let mut timer = interval_at(Instant::now() + period, period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!("Polling r/{} every {period:?}", self.subreddit);

        while self.tracker.is_running() {
            timer.tick().await;
            self.poll_once().await;
        }

        warn!("Tracker stopped, poller exiting");
    }
}
