use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RedditError {
    #[error("App id and secret must both be configured")]
    MissingCredentials,

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} responded with {status}")]
    Status { status: StatusCode, url: String },

    #[error("Token response did not contain an access token")]
    MalformedToken,
}
