//! Work item definitions
//!
//! A work item is one unit of harvest work identified by a business key
//! (an organization number). Status transitions are monotone: an item goes
//! from `Pending` to exactly one terminal status and never back, except
//! through the deliberate operator reset.

use std::fmt;

/// Status of a work item in the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemStatus {
    /// Not yet processed; the only non-terminal status
    Pending,

    /// Record collected and durably written
    Done,

    /// Excluded by a business rule (e.g. a flagged candidate)
    Skipped,

    /// Gave up on this item; never retried automatically
    Failed,
}

impl ItemStatus {
    /// Returns true if this is a terminal status
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Single-letter marker used in the queue file; `None` for pending
    pub fn marker(&self) -> Option<char> {
        match self {
            Self::Pending => None,
            Self::Done => Some('D'),
            Self::Skipped => Some('S'),
            Self::Failed => Some('F'),
        }
    }

    /// Parses a queue-file marker letter
    pub fn from_marker(marker: char) -> Option<Self> {
        match marker {
            'D' => Some(Self::Done),
            'S' => Some(Self::Skipped),
            'F' => Some(Self::Failed),
            _ => None,
        }
    }

    /// Returns true if an item may move from `self` to `to`
    ///
    /// Pending may move to any terminal status; re-marking the same
    /// terminal status is allowed (idempotent), any other terminal
    /// transition is not.
    pub fn can_transition(&self, to: ItemStatus) -> bool {
        match self {
            Self::Pending => to.is_terminal(),
            terminal => *terminal == to,
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Done => "done",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// One unit of harvest work with durable status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    /// Opaque business key, unique within the queue
    pub id: String,

    pub status: ItemStatus,

    /// Reason recorded alongside a Skipped or Failed marker
    pub note: Option<String>,
}

impl WorkItem {
    /// Creates a pending item
    pub fn pending(id: &str) -> Self {
        Self {
            id: id.to_string(),
            status: ItemStatus::Pending,
            note: None,
        }
    }
}
