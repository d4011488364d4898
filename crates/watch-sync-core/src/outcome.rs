use serde::Serialize;
use std::iter::Sum;
use std::ops::Add;

/// Result of syncing a single watched item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemOutcome {
    Completed,
    /// Destination catalog has no such item
    Skipped,
    /// Destination refused the played mark
    Failed,
}

/// Counters for one watch-history sync
///
/// `completed + skipped + failed == total` holds for every outcome produced by
/// recording item results. The "already synced" outcome reports the source
/// item count as both `total` and `skipped`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WatchSyncOutcome {
    pub total: usize,
    pub completed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl WatchSyncOutcome {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every source item is already played on the destination
    pub fn already_synced(source_count: usize) -> Self {
        Self {
            total: source_count,
            skipped: source_count,
            ..Self::default()
        }
    }

    /// Start counting a batch of `total` items
    pub fn pending(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    pub fn record(self, outcome: ItemOutcome) -> Self {
        match outcome {
            ItemOutcome::Completed => Self { completed: self.completed + 1, ..self },
            ItemOutcome::Skipped => Self { skipped: self.skipped + 1, ..self },
            ItemOutcome::Failed => Self { failed: self.failed + 1, ..self },
        }
    }

    pub fn processed(&self) -> usize {
        self.completed + self.skipped + self.failed
    }

    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.processed())
    }
}

impl Add for WatchSyncOutcome {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            total: self.total + other.total,
            completed: self.completed + other.completed,
            skipped: self.skipped + other.skipped,
            failed: self.failed + other.failed,
        }
    }
}

impl Sum for WatchSyncOutcome {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// Counters for the user-creation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UserSyncOutcome {
    pub total: usize,
    pub created: usize,
    pub failed: usize,
}

impl UserSyncOutcome {
    pub fn pending(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    pub fn record(self, created: bool) -> Self {
        if created {
            Self { created: self.created + 1, ..self }
        } else {
            Self { failed: self.failed + 1, ..self }
        }
    }

    pub fn processed(&self) -> usize {
        self.created + self.failed
    }

    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.processed())
    }
}

impl Add for UserSyncOutcome {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            total: self.total + other.total,
            created: self.created + other.created,
            failed: self.failed + other.failed,
        }
    }
}
