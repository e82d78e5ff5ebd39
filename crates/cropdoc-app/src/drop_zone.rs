// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Window-level drop suppression. While any drop zone is mounted, files
// dropped outside it are swallowed instead of making the webview navigate
// to them.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::debug;

/// Counts mounted drop zones. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct DropZones {
    active: Arc<AtomicUsize>,
}

impl DropZones {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a zone; it stays registered until the guard is dropped.
    pub fn register(&self) -> DropZoneRegistration {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(active = now, "drop zone registered");
        DropZoneRegistration {
            active: Arc::clone(&self.active),
        }
    }

    /// Whether stray drops should currently be suppressed.
    pub fn suppress_stray_drops(&self) -> bool {
        self.active.load(Ordering::SeqCst) > 0
    }
}

/// RAII guard for one mounted drop zone.
#[derive(Debug)]
pub struct DropZoneRegistration {
    active: Arc<AtomicUsize>,
}

impl Drop for DropZoneRegistration {
    fn drop(&mut self) {
        let before = self.active.fetch_sub(1, Ordering::SeqCst);
        debug!(active = before.saturating_sub(1), "drop zone released");
    }
}
