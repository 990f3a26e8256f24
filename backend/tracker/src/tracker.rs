use reddit::Post;
use tokio::{
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
};
use tracing::{debug, info};

use crate::{error::TrackerError, leaderboard::Leaderboard, snapshot::SnapshotStore};

pub const COMMAND_BUFFER: usize = 256;

#[derive(Debug)]
pub enum Command {
    Seed(Vec<Post>),
    ApplyListing {
        posts: Vec<Post>,
        reply: oneshot::Sender<Leaderboard>,
    },
    PollFailed,
    NewPost(Post),
    ScoreUpdated(Post),
    NewComment {
        post_id: String,
        title: String,
        body: String,
    },
}

/// Sole owner of the [`SnapshotStore`]. Every change arrives as a
/// [`Command`]; readers get the latest [`Leaderboard`] from a watch channel.
///
/// Only seeding and poll cycles publish. Listener events update the store
/// and become visible with the next poll.
pub struct Tracker {
    store: SnapshotStore,
    commands: mpsc::Receiver<Command>,
    published: watch::Sender<Leaderboard>,
}

/// Cheap to clone. Reads never wait on the tracker.
#[derive(Clone)]
pub struct TrackerHandle {
    commands: mpsc::Sender<Command>,
    leaderboard: watch::Receiver<Leaderboard>,
}

/// Spawns the tracker task. The task returns its store once every handle is
/// dropped.
pub fn spawn_tracker() -> (TrackerHandle, JoinHandle<SnapshotStore>) {
    let (commands_tx, commands_rx) = mpsc::channel(COMMAND_BUFFER);
    let (published, leaderboard) = watch::channel(Leaderboard::default());

    let tracker = Tracker {
        store: SnapshotStore::new(),
        commands: commands_rx,
        published,
    };

    let handle = TrackerHandle {
        commands: commands_tx,
        leaderboard,
    };

    (handle, tokio::spawn(tracker.run()))
}

impl Tracker {
    async fn run(mut self) -> SnapshotStore {
        while let Some(command) = self.commands.recv().await {
            if self.apply(command) {
                self.published.send_replace(self.store.leaderboard());
            }
        }

        debug!("Tracker stopped");
        self.store
    }

    /// Returns whether the leaderboard still needs publishing.
    fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::Seed(posts) => {
                let seeded = self.store.seed(&posts);
                info!("Baselined {seeded} of {} top posts", posts.len());
                true
            }
            Command::ApplyListing { posts, reply } => {
                let leaderboard = self.store.apply_listing(&posts);
                self.published.send_replace(leaderboard.clone());
                let _ = reply.send(leaderboard);
                false
            }
            Command::PollFailed => {
                self.store.reset_deltas();
                true
            }
            Command::NewPost(post) => {
                if self.store.observe(&post) {
                    debug!("Counted post {} for {}", post.id, post.author);
                }
                false
            }
            Command::ScoreUpdated(post) => {
                self.store.record_score(&post);
                false
            }
            Command::NewComment {
                post_id,
                title,
                body,
            } => {
                if self.store.record_comment(&post_id, &body) {
                    info!("Post: {title} : Comment: {body}");
                }
                false
            }
        }
    }
}

impl TrackerHandle {
    async fn send(&self, command: Command) -> Result<(), TrackerError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| TrackerError::Closed)
    }

    pub async fn seed(&self, posts: Vec<Post>) -> Result<(), TrackerError> {
        self.send(Command::Seed(posts)).await
    }

    /// Folds a poll listing in and returns the leaderboard it produced.
    pub async fn apply_listing(&self, posts: Vec<Post>) -> Result<Leaderboard, TrackerError> {
        let (reply, response) = oneshot::channel();
        self.send(Command::ApplyListing { posts, reply }).await?;

        response.await.map_err(|_| TrackerError::Closed)
    }

    pub async fn poll_failed(&self) -> Result<(), TrackerError> {
        self.send(Command::PollFailed).await
    }

    pub async fn new_post(&self, post: Post) -> Result<(), TrackerError> {
        self.send(Command::NewPost(post)).await
    }

    pub async fn score_updated(&self, post: Post) -> Result<(), TrackerError> {
        self.send(Command::ScoreUpdated(post)).await
    }

    pub async fn new_comment(
        &self,
        post_id: String,
        title: String,
        body: String,
    ) -> Result<(), TrackerError> {
        self.send(Command::NewComment {
            post_id,
            title,
            body,
        })
        .await
    }

    /// Latest published leaderboard.
    pub fn leaderboard(&self) -> Leaderboard {
        self.leaderboard.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        !self.commands.is_closed()
    }

    /// Resolves once the leaderboard changes after the last one seen by this handle.
    pub async fn changed(&mut self) -> Result<Leaderboard, TrackerError> {
        self.leaderboard
            .changed()
            .await
            .map_err(|_| TrackerError::Closed)?;

        Ok(self.leaderboard.borrow_and_update().clone())
    }
}
