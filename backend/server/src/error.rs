use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Error in Polling")]
    TrackerStopped,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::TrackerStopped => StatusCode::INTERNAL_SERVER_ERROR,
        };

        error!("Error in Polling: {self:?}");
        (status, self.to_string()).into_response()
    }
}
