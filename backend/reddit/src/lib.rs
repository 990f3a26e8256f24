//! # Reddit
//!
//! Application-only client for the parts of the Reddit API the monitor needs.
//!
//! ## Authentication
//! - `POST /api/v1/access_token?grant_type=client_credentials` with HTTP Basic
//!   auth (`app_id:app_secret`)
//! - Returns `{access_token, token_type, expires_in, scope}`
//! - Every API call carries `Authorization: bearer <token>` against `oauth.reddit.com`
//! - Token is exchanged again once `expires_in` has elapsed
//!
//! ## Listings
//! - Top posts: `/r/{sub}/top?t=day&limit=25`
//! - New posts: `/r/{sub}/new`
//! - New comments: `/r/{sub}/comments`
//! - Score lookups: `/by_id/t3_a,t3_b`
//!
//! All listings share the `{kind, data: {children: [{kind, data}], after}}` envelope.
//!
//! ## Monitors
//! Reddit has no push API for application-only clients, so "subscriptions" are
//! background tasks polling the listings above and emitting [`PlatformEvent`]s
//! for anything not seen before.
use async_trait::async_trait;

pub mod error;
pub mod models;
pub mod monitor;
pub mod remote;

pub use error::RedditError;
pub use models::{AccessToken, Comment, Post};
pub use monitor::{MonitorSettings, PlatformEvent, spawn_monitors};
pub use remote::{Credentials, Endpoints, RedditClient, get_access_token};

/// Window accepted by the `t` parameter of the top listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindow {
    Day,
}

impl TimeWindow {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeWindow::Day => "day",
        }
    }
}

/// Read side of the platform used by the poller and the monitors.
#[async_trait]
pub trait Platform: Send + Sync {
    async fn top_posts(
        &self,
        subreddit: &str,
        window: TimeWindow,
        limit: u32,
    ) -> Result<Vec<Post>, RedditError>;

    async fn new_posts(&self, subreddit: &str, limit: u32) -> Result<Vec<Post>, RedditError>;

    async fn new_comments(&self, subreddit: &str, limit: u32)
    -> Result<Vec<Comment>, RedditError>;

    async fn posts_by_id(&self, fullnames: &[String]) -> Result<Vec<Post>, RedditError>;
}
