use std::{env, fmt::Display, fs::read_to_string, str::FromStr, time::Duration};

use reddit::{Credentials, Endpoints, remote};
use tracing::{info, warn};

const SECRETS_DIR: &str = "/run/secrets";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub subreddit: String,
    pub credentials: Credentials,
    pub endpoints: Endpoints,
    pub poll_interval: Duration,
    pub warmup: Duration,
    pub top_limit: u32,
    pub monitor_interval: Duration,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("RUST_PORT", 1111),
            // Extension point: prompt for the subreddit instead, or pass --subreddit.
            subreddit: try_load("SUBREDDIT", "funny".to_string()),
            credentials: Credentials::new(
                read_secret("REDDIT_APP_ID"),
                read_secret("REDDIT_APP_SECRET"),
            ),
            endpoints: Endpoints {
                auth_url: try_load("REDDIT_AUTH_URL", remote::AUTH_URL.to_string()),
                api_url: try_load("REDDIT_API_URL", remote::API_URL.to_string()),
                user_agent: try_load("REDDIT_USER_AGENT", remote::USER_AGENT.to_string()),
            },
            poll_interval: Duration::from_secs(try_load("POLL_INTERVAL_SECS", 45)),
            warmup: Duration::from_secs(try_load("WARMUP_SECS", 50)),
            top_limit: try_load("TOP_LIMIT", 25),
            monitor_interval: Duration::from_secs(try_load("MONITOR_INTERVAL_SECS", 15)),
        }
    }
}

fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => parse_or_default(key, &raw, default),
        Err(_) => {
            info!("{key} not set, using default: {default}");
            default
        }
    }
}

fn parse_or_default<T>(key: &str, raw: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    raw.trim().parse().unwrap_or_else(|e| {
        warn!("Invalid {key} value {raw:?}: {e}, using default: {default}");
        default
    })
}

/// Reads `/run/secrets/<name>`, falling back to the environment. A missing
/// secret is empty, which leaves the service unconfigured.
fn read_secret(secret_name: &str) -> String {
    let path = format!("{SECRETS_DIR}/{secret_name}");

    read_to_string(&path)
        .map(|s| s.trim().to_string())
        .or_else(|_| env::var(secret_name).map(|s| s.trim().to_string()))
        .unwrap_or_else(|_| {
            warn!("Secret {secret_name} not found in {SECRETS_DIR} or environment");
            String::new()
        })
}
