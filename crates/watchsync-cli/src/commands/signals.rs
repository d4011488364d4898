use crate::output::Output;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use watch_sync_core::Interrupt;

pub const INTERRUPTED_MESSAGE: &str = "Sync interrupted by user.";

/// Marks when a sync phase is running
///
/// Ctrl-C during a phase asks the reconciler to stop at the next item
/// boundary; anywhere else (prompts, listings) it ends the process.
#[derive(Debug, Clone, Default)]
pub struct SyncPhase {
    active: Arc<AtomicBool>,
}

pub struct PhaseGuard {
    active: Arc<AtomicBool>,
}

impl SyncPhase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&self) -> PhaseGuard {
        self.active.store(true, Ordering::SeqCst);
        PhaseGuard {
            active: self.active.clone(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

impl Drop for PhaseGuard {
    fn drop(&mut self) {
        self.active.store(false, Ordering::SeqCst);
    }
}

/// Listen for Ctrl-C for the rest of the process lifetime
pub fn spawn_interrupt_listener(interrupt: Interrupt, phase: SyncPhase, output: Output) {
    tokio::spawn(async move {
        loop {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "Unable to listen for Ctrl-C");
                return;
            }

            if phase.is_active() && !interrupt.is_triggered() {
                tracing::info!("Interrupt received, stopping after the current item");
                output.warn("Stopping after the current item... (press Ctrl-C again to quit now)");
                interrupt.trigger();
            } else {
                wait_for_item(&interrupt).await;
                output.warn(format!("\n{}", INTERRUPTED_MESSAGE));
                std::process::exit(0);
            }
        }
    });
}

/// Wait until no item has writes under way
async fn wait_for_item(interrupt: &Interrupt) {
    if interrupt.item_in_flight() {
        tracing::info!("Waiting for the current item to finish before exiting");
    }
    while interrupt.item_in_flight() {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}
