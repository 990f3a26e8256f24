//! # Tracker
//!
//! Upvote and author aggregation for one subreddit since process start.
//!
//! ## State
//! - Baseline: post ID → (title, upvotes when first seen). Written once per post,
//!   except by score notifications which overwrite it with the absolute score
//! - Authors: author → number of distinct posts observed
//! - Deltas: post ID → upvotes gained over the baseline, rebuilt every poll,
//!   only positive gains kept
//! - Comments: post ID → first comment body seen, logged only
//!
//! Nothing is evicted; the maps grow for the life of the process.
//!
//! ## Ownership
//! A single [`Tracker`] task owns the store. The poller and the update
//! listener send it [`tracker::Command`]s; after each change it publishes a
//! rendered [`Leaderboard`] on a watch channel, so HTTP reads never wait.
//!
//! ## Poll cycle
//! 1. Fetch `top?t=day&limit=25`
//! 2. For posts with a baseline, `gain = ups - baseline`, kept if `gain > 0`
//! 3. Posts without a baseline are baselined at their current upvotes
//! 4. On failure, log, clear the deltas and return an empty leaderboard
pub mod error;
pub mod leaderboard;
pub mod listener;
pub mod poller;
pub mod snapshot;
pub mod tracker;

pub use error::{ListenerEventError, TrackerError};
pub use leaderboard::Leaderboard;
pub use listener::UpdateListener;
pub use poller::Poller;
pub use snapshot::SnapshotStore;
pub use tracker::{Tracker, TrackerHandle, spawn_tracker};
