use std::time::{Duration, Instant};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracker::{Leaderboard, TrackerHandle};

use crate::error::AppError;

pub const UNCONFIGURED_MESSAGE: &str =
    "Please configure the app with a valid Reddit app id and secret";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryStatus {
    /// No platform client; terminal until restarted with valid credentials.
    Unconfigured,
    Warming { remaining: Duration },
    Ready,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollInformation {
    Message(String),
    Leaderboard(Leaderboard),
}

impl IntoResponse for PollInformation {
    fn into_response(self) -> Response {
        match self {
            PollInformation::Message(message) => (StatusCode::OK, message).into_response(),
            PollInformation::Leaderboard(leaderboard) => {
                (StatusCode::OK, Json(leaderboard)).into_response()
            }
        }
    }
}

/// Serves the leaderboard once the warm-up window has passed.
pub struct QueryService {
    tracker: Option<TrackerHandle>,
    started: Instant,
    warmup: Duration,
}

impl QueryService {
    pub fn new(tracker: Option<TrackerHandle>, started: Instant, warmup: Duration) -> Self {
        Self {
            tracker,
            started,
            warmup,
        }
    }

    pub fn status_at(&self, now: Instant) -> QueryStatus {
        if self.tracker.is_none() {
            return QueryStatus::Unconfigured;
        }

        let elapsed = now.saturating_duration_since(self.started);
        if elapsed >= self.warmup {
            QueryStatus::Ready
        } else {
            QueryStatus::Warming {
                remaining: self.warmup - elapsed,
            }
        }
    }

    pub fn respond_at(&self, now: Instant) -> Result<PollInformation, AppError> {
        match (self.status_at(now), &self.tracker) {
            (QueryStatus::Ready, Some(tracker)) => {
                if !tracker.is_running() {
                    return Err(AppError::TrackerStopped);
                }

                Ok(PollInformation::Leaderboard(tracker.leaderboard()))
            }
            (QueryStatus::Warming { remaining }, _) => {
                Ok(PollInformation::Message(wait_message(remaining)))
            }
            _ => Ok(PollInformation::Message(UNCONFIGURED_MESSAGE.to_string())),
        }
    }

    pub fn respond(&self) -> Result<PollInformation, AppError> {
        self.respond_at(Instant::now())
    }
}

/// Remaining time is rounded up so the message never says 0 while warming.
pub fn wait_message(remaining: Duration) -> String {
    let seconds = remaining.as_millis().div_ceil(1000);
    format!("Gathering data... Please try again in {seconds} seconds.")
}
