//! Durable record output
//!
//! Completed records are appended to an ordered, append-only stream. The
//! sink is durable per record: the orchestrator only marks a work item done
//! after `append` returns, which makes the pipeline at-least-once — a crash
//! between append and the queue update re-processes the item and appends a
//! duplicate rather than losing a record.

mod jsonl;
mod traits;

pub use jsonl::JsonlSink;
pub use traits::{RecordSink, SinkError, SinkResult};
