use std::sync::Arc;

use axum::extract;
use tracing::debug;

use crate::{error::AppError, query::PollInformation, state::State};

pub const POLL_INFORMATION_PATH: &str = "/RedditAdapter/GetPollInformation";

/// Posts with the most upvotes gained and users with the most posts since start.
pub async fn poll_information_handler(
    extract::State(state): extract::State<Arc<State>>,
) -> Result<PollInformation, AppError> {
    debug!("Poll information requested for r/{}", state.config.subreddit);

    state.query.respond()
}
