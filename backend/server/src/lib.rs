//! Documentation of a subreddit upvote monitor.
//!
//! Polls a subreddit's top posts of the day, tracks how many upvotes each post
//! gained since the process started and how many posts each author made, and
//! serves the result from one endpoint.
//!
//!
//!
//! # General Infrastructure
//! - On start, exchange the Reddit app id and secret for an application-only bearer token
//! - Baseline the current top 25 posts of the day
//! - Every 45 seconds, fetch the top 25 again and diff against the baseline
//! - Background monitors watch new posts, new comments and score changes
//! - A single tracker task owns all aggregation state
//! - `GET /RedditAdapter/GetPollInformation` reads the latest published leaderboard
//!
//!
//!
//! # Response
//!
//! Before the 50 second warm-up window:
//! ```text
//! Gathering data... Please try again in 42 seconds.
//! ```
//!
//! After:
//! ```json
//! { "PostsToUpvotes": { "Post A": 5 }, "UsersToPosts": { "alice": 2 } }
//! ```
//!
//! Without valid credentials the endpoint keeps answering with a configuration
//! message until the process is restarted.
//!
//!
//!
//! # Notes
//!
//! ## Identity
//! Posts are keyed by their Reddit ID. Titles are only used when rendering,
//! and a repeated title is suffixed with the post ID.
//!
//! ## Author counts
//! Authors are counted once per distinct post, whether the post was first seen
//! in a top listing or through the new post monitor.
//!
//! ## Failed polls
//! A failed poll is logged, clears the cycle's gains and is retried on the next tick.
//!
//!
//!
//! # Setup
//!
//! Secrets are read from `/run/secrets` or the environment.
//! ```sh
//! export REDDIT_APP_ID=...
//! export REDDIT_APP_SECRET=...
//! RUST_LOG=info cargo run --bin subreddit-monitor -- --subreddit funny
//! ```
//!
//! Query.
//! ```sh
//! curl localhost:1111/RedditAdapter/GetPollInformation
//! ```
use std::time::Duration;

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::get,
};

use anyhow::Context;
#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};
use tokio::{net::TcpListener, signal::ctrl_c};
use tower_http::cors::CorsLayer;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod error;
pub mod query;
pub mod routes;
pub mod state;

use config::Config;
use routes::{POLL_INFORMATION_PATH, poll_information_handler};
use state::State;

/// Command-line values that take precedence over the environment.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub subreddit: Option<String>,
    pub port: Option<u16>,
}

impl Overrides {
    pub fn apply(self, mut config: Config) -> Config {
        if let Some(subreddit) = self.subreddit {
            config.subreddit = subreddit;
        }
        if let Some(port) = self.port {
            config.port = port;
        }

        config
    }
}

pub fn build_router(state: std::sync::Arc<State>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route(POLL_INFORMATION_PATH, get(poll_information_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn start_server(overrides: Overrides) -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config = overrides.apply(Config::load());

    info!("Initializing state for r/{}...", config.subreddit);
    let state = State::new(config).await;

    info!("Starting server...");
    let app = build_router(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
