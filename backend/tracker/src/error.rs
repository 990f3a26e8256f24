use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackerError {
    #[error("Tracker is no longer running")]
    Closed,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ListenerEventError {
    #[error("Post has no id")]
    MissingPostId,

    #[error("Post {0} has no author")]
    MissingAuthor(String),

    #[error("Post {0} has no title")]
    MissingTitle(String),

    #[error("Comment {0} is not attached to a post")]
    MissingParent(String),

    #[error("Comment {0} has no body")]
    EmptyComment(String),

    #[error(transparent)]
    Tracker(#[from] TrackerError),
}
