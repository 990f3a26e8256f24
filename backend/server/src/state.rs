use std::{sync::Arc, time::Instant};

use chrono::{Local, NaiveDate};
use reddit::{
    MonitorSettings, Platform, Post, RedditClient, RedditError, TimeWindow, spawn_monitors,
};
use tokio::sync::mpsc;
use tracing::{error, info};
use tracker::{Poller, TrackerHandle, UpdateListener, spawn_tracker};

use super::{config::Config, query::QueryService};

const EVENT_BUFFER: usize = 256;

pub struct State {
    pub config: Config,
    pub query: QueryService,
}

impl State {
    /// Authenticates and starts tracking. Bad credentials leave the state
    /// unconfigured rather than failing startup.
    pub async fn new(config: Config) -> Arc<Self> {
        let started = Instant::now();

        let tracker = match connect(&config).await {
            Ok(platform) => Some(start_tracking(platform, &config).await),
            Err(e) => {
                error!("Reddit client initialization failed: {e}");
                error!("Configure REDDIT_APP_ID and REDDIT_APP_SECRET and restart");
                None
            }
        };

        let query = QueryService::new(tracker, started, config.warmup);
        Arc::new(Self { config, query })
    }
}

async fn connect(config: &Config) -> Result<Arc<dyn Platform>, RedditError> {
    let client =
        RedditClient::connect(config.credentials.clone(), config.endpoints.clone()).await?;

    Ok(Arc::new(client))
}

/// Keeps the posts created on `today`, local time.
fn created_on(posts: Vec<Post>, today: NaiveDate) -> Vec<Post> {
    posts
        .into_iter()
        .filter(|post| {
            post.created_at()
                .map(|created| created.with_timezone(&Local).date_naive())
                == Some(today)
        })
        .collect()
}

/// Seeds the baseline from today's top posts, then starts the monitors, the
/// update listener and the poller.
pub async fn start_tracking(platform: Arc<dyn Platform>, config: &Config) -> TrackerHandle {
    let (tracker, _) = spawn_tracker();

    let now = Local::now();
    info!("## Top Posts for {}", now.format("%A, %B %-d, %Y"));

    let top = platform
        .top_posts(&config.subreddit, TimeWindow::Day, config.top_limit)
        .await
        .unwrap_or_else(|e| {
            error!("Error in Adapter: {e}");
            Vec::new()
        });
    let seed = created_on(top, now.date_naive());

    if seed.is_empty() {
        info!("There were no new top posts today.");
    }

    if let Err(e) = tracker.seed(seed.clone()).await {
        error!("Could not seed baseline: {e}");
    }

    let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);
    spawn_monitors(
        platform.clone(),
        MonitorSettings {
            subreddit: config.subreddit.clone(),
            interval: config.monitor_interval,
            limit: config.top_limit,
        },
        seed,
        events_tx,
    );
    tokio::spawn(UpdateListener::new(tracker.clone()).run(events_rx));

    let poller = Arc::new(
        Poller::new(platform, tracker.clone(), &config.subreddit).with_limit(config.top_limit),
    );
    tokio::spawn(poller.run(config.poll_interval));

    tracker
}

#[cfg(test)]
mod tests {
    use chrono::{Days, TimeZone};

    use super::*;

    fn post(id: &str, created: chrono::DateTime<Local>) -> Post {
        Post {
            id: id.to_string(),
            title: id.to_string(),
            author: "alice".to_string(),
            created_utc: created.timestamp() as f64,
            ..Default::default()
        }
    }

    #[test]
    fn test_seed_keeps_posts_created_today() {
        let noon = Local
            .with_ymd_and_hms(2024, 5, 14, 12, 0, 0)
            .single()
            .unwrap();
        let yesterday = noon.checked_sub_days(Days::new(1)).unwrap();

        let kept = created_on(
            vec![post("today", noon), post("yesterday", yesterday)],
            noon.date_naive(),
        );

        let ids: Vec<_> = kept.iter().map(|post| post.id.as_str()).collect();
        assert_eq!(ids, vec!["today"]);
    }

    #[test]
    fn test_seed_drops_posts_without_timestamp() {
        let today = Local::now().date_naive();
        let undated = Post {
            id: "a".to_string(),
            ..Default::default()
        };

        assert!(created_on(vec![undated], today).is_empty());
    }
}
