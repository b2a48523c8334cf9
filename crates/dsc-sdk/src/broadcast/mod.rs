//! Announcement flows with confirmation tracking.
//!
//! [`Broadcaster`] runs the three flows (plain announce, hash lock followed by
//! a bonded aggregate, detached cosignature) and returns an [`Outcome`].

mod broadcaster;
mod links;
mod outcome;

pub use broadcaster::{Broadcaster, NETWORK_ERROR, SUBMISSION_ERROR};
pub use links::ExplorerLinks;
pub use outcome::{BroadcastEvent, CancelReason, FailureStage, Outcome};
