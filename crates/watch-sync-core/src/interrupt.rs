use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared stop request, checked between items and between users
///
/// Also tracks whether an item's writes are under way, so a forced exit can
/// wait for the item to finish instead of leaving it half written.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    requested: Arc<AtomicBool>,
    item_in_flight: Arc<AtomicBool>,
}

/// Marks an item as in flight until dropped
pub struct ItemGuard {
    in_flight: Arc<AtomicBool>,
}

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    pub fn begin_item(&self) -> ItemGuard {
        self.item_in_flight.store(true, Ordering::SeqCst);
        ItemGuard {
            in_flight: self.item_in_flight.clone(),
        }
    }

    pub fn item_in_flight(&self) -> bool {
        self.item_in_flight.load(Ordering::SeqCst)
    }
}

impl Drop for ItemGuard {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::SeqCst);
    }
}
