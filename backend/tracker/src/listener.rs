use reddit::{Comment, PlatformEvent, Post};
use tokio::sync::mpsc::Receiver;
use tracing::{debug, info, warn};

use crate::{error::ListenerEventError, tracker::TrackerHandle};

/// Folds platform notifications into the tracker. Each event is handled on
/// its own; a bad one is logged and dropped.
pub struct UpdateListener {
    tracker: TrackerHandle,
}

impl UpdateListener {
    pub fn new(tracker: TrackerHandle) -> Self {
        Self { tracker }
    }

    /// Consumes events until every monitor has stopped.
    pub async fn run(self, mut events: Receiver<PlatformEvent>) {
        while let Some(event) = events.recv().await {
            self.handle(event).await;
        }

        debug!("Update listener stopped");
    }

    pub async fn handle(&self, event: PlatformEvent) {
        match event {
            PlatformEvent::NewPosts(posts) => {
                for post in posts {
                    if let Err(e) = self.on_new_post(post).await {
                        warn!("Exception in new posts updated: {e}");
                    }
                }
            }
            PlatformEvent::ScoreUpdated(post) => {
                if let Err(e) = self.on_score_updated(post).await {
                    warn!("Error in post score updated: {e}");
                }
            }
            PlatformEvent::NewComments(comments) => {
                for comment in comments {
                    if let Err(e) = self.on_new_comment(comment).await {
                        warn!("Error in new comments updated: {e}");
                    }
                }
            }
        }
    }

    async fn on_new_post(&self, post: Post) -> Result<(), ListenerEventError> {
        validate_post(&post)?;

        info!("New Post by {}: {}", post.author, post.title);
        self.tracker.new_post(post).await?;

        Ok(())
    }

    async fn on_score_updated(&self, post: Post) -> Result<(), ListenerEventError> {
        if post.id.is_empty() {
            return Err(ListenerEventError::MissingPostId);
        }

        debug!("Score of {} is now {}", post.id, post.score);
        self.tracker.score_updated(post).await?;

        Ok(())
    }

    async fn on_new_comment(&self, comment: Comment) -> Result<(), ListenerEventError> {
        let post_id = comment.post_id().to_string();

        if post_id.is_empty() {
            return Err(ListenerEventError::MissingParent(comment.id));
        }
        if comment.body.trim().is_empty() {
            return Err(ListenerEventError::EmptyComment(comment.id));
        }

        let title = if comment.link_title.is_empty() {
            post_id.clone()
        } else {
            comment.link_title
        };

        self.tracker
            .new_comment(post_id, title, comment.body)
            .await?;

        Ok(())
    }
}

fn validate_post(post: &Post) -> Result<(), ListenerEventError> {
    if post.id.is_empty() {
        return Err(ListenerEventError::MissingPostId);
    }
    if post.author.is_empty() {
        return Err(ListenerEventError::MissingAuthor(post.id.clone()));
    }
    if post.title.is_empty() {
        return Err(ListenerEventError::MissingTitle(post.id.clone()));
    }

    Ok(())
}
