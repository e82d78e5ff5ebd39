// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Preview encoding — turns a prepared image into a `data:` URI that the UI
// can render without touching the network — and the registry that owns
// live previews until they are released.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use cropdoc_core::error::{CropdocError, Result};
use cropdoc_core::types::{PreparedImage, PreviewString};
use tracing::{debug, instrument};

/// Build the `data:<mime>;base64,<payload>` string for raw bytes.
pub fn data_uri(mime_type: &str, bytes: &[u8]) -> PreviewString {
    PreviewString::new(format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes)))
}

/// Encode a prepared image off the async executor.
///
/// Fails only if the encoding task itself fails; the error is explicit,
/// never an empty preview.
#[instrument(skip_all, fields(name = %image.name, size = image.size()))]
pub async fn encode_preview(image: &PreparedImage) -> Result<PreviewString> {
    let mime = image.mime_type.clone();
    let bytes = image.bytes.clone();
    let preview = tokio::task::spawn_blocking(move || data_uri(&mime, &bytes))
        .await
        .map_err(|err| CropdocError::Preview(err.to_string()))?;
    debug!(len = preview.as_str().len(), "preview encoded");
    Ok(preview)
}

/// Opaque reference to a registered preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PreviewHandle(u64);

#[derive(Default)]
struct RegistryInner {
    next_id: u64,
    live: HashMap<u64, PreviewString>,
}

/// Owner of every live preview.
///
/// Cheaply cloneable; clones share the same set of previews. Releasing a
/// handle twice is a no-op.
#[derive(Clone, Default)]
pub struct PreviewRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, preview: PreviewString) -> PreviewHandle {
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.live.insert(id, preview);
        debug!(id, live = inner.live.len(), "preview registered");
        PreviewHandle(id)
    }

    pub fn get(&self, handle: PreviewHandle) -> Option<PreviewString> {
        self.lock().live.get(&handle.0).cloned()
    }

    /// Free a preview. Returns `true` only for the call that actually freed it.
    pub fn release(&self, handle: PreviewHandle) -> bool {
        let mut inner = self.lock();
        let freed = inner.live.remove(&handle.0).is_some();
        if freed {
            debug!(id = handle.0, live = inner.live.len(), "preview released");
        }
        freed
    }

    pub fn live_count(&self) -> usize {
        self.lock().live.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RegistryInner> {
        // A poisoned registry still holds valid strings; keep using it.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for PreviewRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewRegistry")
            .field("live", &self.live_count())
            .finish()
    }
}
