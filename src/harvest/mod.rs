//! The harvest loop
//!
//! This module ties the other components together: the orchestrator pulls
//! pending items off the queue, drives the navigation protocol over a
//! session-managed page client and routes every outcome through one
//! classifier, so that business skips, deterministic dead ends and
//! session-fatal faults each take exactly one path. Pacing toward the
//! target lives in [`Throttle`].

mod orchestrator;
mod protocol;
mod throttle;

pub use orchestrator::{Orchestrator, RunSummary};
pub use protocol::{ItemOutcome, Navigator, StepError};
pub use throttle::Throttle;
