//! Durable line-oriented work queue
//!
//! Backing format, one item per line:
//!
//! ```text
//! 556631-3788
//! 556681-9685\tD
//! 556679-7394\tS\tflagged candidate
//! ```
//!
//! A bare identifier is pending; a tab-separated marker letter makes it
//! terminal, with an optional note after a second tab. Every status change
//! rewrites the whole file through a temp-file-then-rename so a crash
//! mid-rewrite leaves either the old or the new file, never a torn one —
//! a completed item can not silently resurrect.

use crate::queue::{ItemStatus, WorkItem};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during queue operations
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Duplicate item id in queue: {0}")]
    DuplicateItem(String),

    #[error("Unknown item id: {0}")]
    UnknownItem(String),

    #[error("Invalid status transition for {id}: {from} -> {to}")]
    InvalidTransition {
        id: String,
        from: ItemStatus,
        to: ItemStatus,
    },

    #[error("Malformed queue line {line_no}: {line:?}")]
    Malformed { line_no: usize, line: String },
}

/// Result type for queue operations
pub type QueueResult<T> = Result<T, QueueError>;

/// Per-status item counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub pending: usize,
    pub done: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// A durable, ordered work queue over a line-oriented file
#[derive(Debug)]
pub struct FileQueue {
    path: PathBuf,
    items: Vec<WorkItem>,
    index: HashMap<String, usize>,
}

impl FileQueue {
    /// Loads the queue from the backing file
    ///
    /// Item order is file order and stays stable across restarts. Blank
    /// lines are ignored; duplicate ids and unknown markers are errors.
    pub fn load(path: &Path) -> QueueResult<Self> {
        let content = fs::read_to_string(path)?;
        let mut items = Vec::new();
        let mut index = HashMap::new();

        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim_end();
            if line.trim().is_empty() {
                continue;
            }

            let mut parts = line.splitn(3, '\t');
            let id = parts.next().unwrap_or_default().trim().to_string();
            if id.is_empty() {
                return Err(QueueError::Malformed {
                    line_no: line_no + 1,
                    line: line.to_string(),
                });
            }

            let status = match parts.next() {
                None => ItemStatus::Pending,
                Some(marker) => {
                    let mut chars = marker.chars();
                    match (chars.next().and_then(ItemStatus::from_marker), chars.next()) {
                        (Some(status), None) => status,
                        _ => {
                            return Err(QueueError::Malformed {
                                line_no: line_no + 1,
                                line: line.to_string(),
                            })
                        }
                    }
                }
            };
            let note = parts.next().map(|n| n.to_string()).filter(|n| !n.is_empty());

            if index.contains_key(&id) {
                return Err(QueueError::DuplicateItem(id));
            }
            index.insert(id.clone(), items.len());
            items.push(WorkItem { id, status, note });
        }

        tracing::debug!(
            "Loaded queue from {}: {} items total",
            path.display(),
            items.len()
        );

        Ok(Self {
            path: path.to_path_buf(),
            items,
            index,
        })
    }

    /// Returns the first pending item, if any
    ///
    /// Re-running over the same file yields the same order across
    /// surviving items, so an interrupted run resumes where it stopped.
    pub fn next_pending(&self) -> Option<&WorkItem> {
        self.items.iter().find(|i| i.status == ItemStatus::Pending)
    }

    /// Returns all pending items in stable order
    pub fn pending(&self) -> Vec<&WorkItem> {
        self.items
            .iter()
            .filter(|i| i.status == ItemStatus::Pending)
            .collect()
    }

    /// Total number of items in the queue
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the queue holds no items at all
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Per-status counts for progress reporting
    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for item in &self.items {
            match item.status {
                ItemStatus::Pending => counts.pending += 1,
                ItemStatus::Done => counts.done += 1,
                ItemStatus::Skipped => counts.skipped += 1,
                ItemStatus::Failed => counts.failed += 1,
            }
        }
        counts
    }

    /// Looks up an item by id
    pub fn get(&self, id: &str) -> Option<&WorkItem> {
        self.index.get(id).map(|&i| &self.items[i])
    }

    /// Marks an item as done and persists the queue
    pub fn mark_done(&mut self, id: &str) -> QueueResult<()> {
        self.mark(id, ItemStatus::Done, None)
    }

    /// Marks an item as skipped with a reason and persists the queue
    pub fn mark_skipped(&mut self, id: &str, reason: &str) -> QueueResult<()> {
        self.mark(id, ItemStatus::Skipped, Some(reason))
    }

    /// Marks an item as failed with a reason and persists the queue
    pub fn mark_failed(&mut self, id: &str, reason: &str) -> QueueResult<()> {
        self.mark(id, ItemStatus::Failed, Some(reason))
    }

    fn mark(&mut self, id: &str, status: ItemStatus, note: Option<&str>) -> QueueResult<()> {
        let idx = *self
            .index
            .get(id)
            .ok_or_else(|| QueueError::UnknownItem(id.to_string()))?;

        let current = self.items[idx].status;
        if current == status {
            // Idempotent re-mark; the store already reflects it.
            return Ok(());
        }
        if !current.can_transition(status) {
            return Err(QueueError::InvalidTransition {
                id: id.to_string(),
                from: current,
                to: status,
            });
        }

        self.items[idx].status = status;
        self.items[idx].note = note.map(sanitize_note);
        self.persist()?;

        tracing::debug!("Marked {} as {}", id, status);
        Ok(())
    }

    /// Resets all failed items to pending and persists the queue
    ///
    /// This is the deliberate operator reset; nothing in the harvest loop
    /// calls it. Returns the number of items reset.
    pub fn reset_failed(&mut self) -> QueueResult<usize> {
        let mut reset = 0;
        for item in &mut self.items {
            if item.status == ItemStatus::Failed {
                item.status = ItemStatus::Pending;
                item.note = None;
                reset += 1;
            }
        }
        if reset > 0 {
            self.persist()?;
        }
        Ok(reset)
    }

    /// Atomically rewrites the backing file
    fn persist(&self) -> std::io::Result<()> {
        let tmp_path = self.path.with_extension("tmp");

        let mut tmp = File::create(&tmp_path)?;
        for item in &self.items {
            match (item.status.marker(), &item.note) {
                (None, _) => writeln!(tmp, "{}", item.id)?,
                (Some(marker), None) => writeln!(tmp, "{}\t{}", item.id, marker)?,
                (Some(marker), Some(note)) => writeln!(tmp, "{}\t{}\t{}", item.id, marker, note)?,
            }
        }
        tmp.sync_all()?;
        drop(tmp);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

/// Notes share the line with the id and marker, so they must stay on it
fn sanitize_note(note: &str) -> String {
    note.replace(['\t', '\n', '\r'], " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use tempfile::TempDir;

    fn write_queue(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("queue.txt");
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_mixed_statuses() {
        let dir = TempDir::new().unwrap();
        let path = write_queue(
            &dir,
            "556631-3788\n556681-9685\tD\n556679-7394\tS\tflagged\n\n556736-5258\tF\ttimeout\n",
        );

        let queue = FileQueue::load(&path).unwrap();
        assert_eq!(queue.len(), 4);

        let counts = queue.counts();
        assert_eq!(counts.pending, 1);
        assert_eq!(counts.done, 1);
        assert_eq!(counts.skipped, 1);
        assert_eq!(counts.failed, 1);

        let skipped = queue.get("556679-7394").unwrap();
        assert_eq!(skipped.note.as_deref(), Some("flagged"));
    }

    #[test]
    fn test_pending_excludes_terminal_items() {
        let dir = TempDir::new().unwrap();
        let path = write_queue(&dir, "a\tD\nb\nc\tS\tx\nd\n");

        let queue = FileQueue::load(&path).unwrap();
        let pending: Vec<&str> = queue.pending().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(pending, vec!["b", "d"]);
        assert_eq!(queue.next_pending().unwrap().id, "b");
    }

    #[test]
    fn test_order_is_stable_across_reload() {
        let dir = TempDir::new().unwrap();
        let path = write_queue(&dir, "c\na\nb\n");

        let mut queue = FileQueue::load(&path).unwrap();
        queue.mark_done("c").unwrap();

        let reloaded = FileQueue::load(&path).unwrap();
        let pending: Vec<&str> = reloaded.pending().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(pending, vec!["a", "b"]);
    }

    #[test]
    fn test_duplicate_id_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_queue(&dir, "a\nb\na\tD\n");

        let result = FileQueue::load(&path);
        assert!(matches!(result, Err(QueueError::DuplicateItem(id)) if id == "a"));
    }

    #[test]
    fn test_unknown_marker_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_queue(&dir, "a\tQ\n");

        let result = FileQueue::load(&path);
        assert!(matches!(result, Err(QueueError::Malformed { line_no: 1, .. })));
    }

    #[test]
    fn test_mark_done_persists_atomically() {
        let dir = TempDir::new().unwrap();
        let path = write_queue(&dir, "a\nb\n");

        let mut queue = FileQueue::load(&path).unwrap();
        queue.mark_done("a").unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "a\tD\nb\n");
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_mark_done_twice_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = write_queue(&dir, "a\n");

        let mut queue = FileQueue::load(&path).unwrap();
        queue.mark_done("a").unwrap();
        let first = fs::read_to_string(&path).unwrap();

        queue.mark_done("a").unwrap();
        let second = fs::read_to_string(&path).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_conflicting_terminal_transition_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_queue(&dir, "a\n");

        let mut queue = FileQueue::load(&path).unwrap();
        queue.mark_done("a").unwrap();

        let result = queue.mark_failed("a", "late failure");
        assert!(matches!(
            result,
            Err(QueueError::InvalidTransition {
                from: ItemStatus::Done,
                to: ItemStatus::Failed,
                ..
            })
        ));
    }

    #[test]
    fn test_unknown_item_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_queue(&dir, "a\n");

        let mut queue = FileQueue::load(&path).unwrap();
        let result = queue.mark_done("zzz");
        assert!(matches!(result, Err(QueueError::UnknownItem(_))));
    }

    #[test]
    fn test_note_with_tabs_is_sanitized() {
        let dir = TempDir::new().unwrap();
        let path = write_queue(&dir, "a\n");

        let mut queue = FileQueue::load(&path).unwrap();
        queue.mark_failed("a", "broken\tselector\nchain").unwrap();

        let reloaded = FileQueue::load(&path).unwrap();
        let item = reloaded.get("a").unwrap();
        assert_eq!(item.note.as_deref(), Some("broken selector chain"));
    }

    #[test]
    fn test_reset_failed_requeues_only_failed() {
        let dir = TempDir::new().unwrap();
        let path = write_queue(&dir, "a\tF\tx\nb\tD\nc\tF\ty\nd\n");

        let mut queue = FileQueue::load(&path).unwrap();
        let reset = queue.reset_failed().unwrap();
        assert_eq!(reset, 2);

        let reloaded = FileQueue::load(&path).unwrap();
        let counts = reloaded.counts();
        assert_eq!(counts.pending, 3);
        assert_eq!(counts.done, 1);
        assert_eq!(counts.failed, 0);
    }

    #[test]
    fn test_empty_queue_is_normal() {
        let dir = TempDir::new().unwrap();
        let path = write_queue(&dir, "");

        let queue = FileQueue::load(&path).unwrap();
        assert!(queue.is_empty());
        assert!(queue.next_pending().is_none());
    }
}
