//! Tree-changed notifications for the presentation layer.
//!
//! # Invariants
//! - Signalling never fails and never blocks.

use log::info;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Receives a signal whenever the filing pipeline changed the tree.
pub trait UiNotifier {
    /// Marks the rendered tree as stale.
    fn signal_tree_changed(&self);
}

impl<T: UiNotifier + ?Sized> UiNotifier for &T {
    fn signal_tree_changed(&self) {
        (**self).signal_tree_changed();
    }
}

/// Pending "refresh the tree" flag, consumed by the view once per render.
#[derive(Debug, Default)]
pub struct TreeRefreshSignal {
    pending: AtomicBool,
    raised: AtomicU64,
}

impl TreeRefreshSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether a refresh was requested and clears the flag.
    pub fn take_pending(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }

    /// Returns whether a refresh is requested, leaving the flag untouched.
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Total number of signals raised since creation.
    pub fn raised_count(&self) -> u64 {
        self.raised.load(Ordering::Relaxed)
    }
}

impl UiNotifier for TreeRefreshSignal {
    fn signal_tree_changed(&self) {
        self.pending.store(true, Ordering::Release);
        self.raised.fetch_add(1, Ordering::Relaxed);
    }
}

/// Notifier that only emits a log event. Used by headless callers.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl UiNotifier for LogNotifier {
    fn signal_tree_changed(&self) {
        info!("event=tree_changed module=service status=ok");
    }
}
