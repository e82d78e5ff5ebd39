// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer — loads configuration and builds the collaborators
// the Dioxus UI reaches through `use_context::<AppServices>()`.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use cropdoc_client::PredictionClient;
use cropdoc_core::AppConfig;
use cropdoc_core::error::Result;
use cropdoc_core::result::DisplayResult;
use cropdoc_core::types::PreparedImage;
use cropdoc_image::PreviewRegistry;
use tracing::{info, warn};

use super::data_dir;
use crate::drop_zone::DropZones;
use crate::export;

/// Shared application services.
///
/// Every field is cheap to clone, so the struct can be moved into event
/// handlers and spawned tasks freely.
#[derive(Clone)]
pub struct AppServices {
    config: Arc<AppConfig>,
    client: PredictionClient,
    previews: PreviewRegistry,
    drop_zones: DropZones,
    data_dir: PathBuf,
    last_health: Arc<Mutex<Option<String>>>,
}

impl AppServices {
    /// Initialise all services. Call once at app startup.
    pub fn init() -> Result<Self> {
        let dir = data_dir::data_dir();
        info!(path = %dir.display(), "initialising app services");

        let config = load_config(&dir).unwrap_or_default().with_env_overrides();
        Self::with_config(config, dir)
    }

    /// Build services around an explicit config.
    pub fn with_config(config: AppConfig, data_dir: PathBuf) -> Result<Self> {
        let client = PredictionClient::new(&config)?;
        info!(api = %client.base_url(), "app services initialised");
        Ok(Self {
            config: Arc::new(config),
            client,
            previews: PreviewRegistry::new(),
            drop_zones: DropZones::new(),
            data_dir,
            last_health: Arc::new(Mutex::new(None)),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn client(&self) -> PredictionClient {
        self.client.clone()
    }

    pub fn previews(&self) -> PreviewRegistry {
        self.previews.clone()
    }

    pub fn drop_zones(&self) -> DropZones {
        self.drop_zones.clone()
    }

    // -- Export --------------------------------------------------------------

    /// Where exports go: the configured directory, else `<data_dir>/exports`.
    pub fn export_dir(&self) -> PathBuf {
        match self.config.export_dir {
            Some(ref dir) => dir.clone(),
            None => self.data_dir.join("exports"),
        }
    }

    pub async fn export_result(&self, result: &DisplayResult, image: &PreparedImage) -> Result<PathBuf> {
        export::write_export(&self.export_dir(), result, image).await
    }

    // -- Diagnostics ---------------------------------------------------------

    /// Probe the prediction service and remember a one-line summary.
    pub async fn probe_health(&self) -> String {
        let summary = match self.client.health_check().await {
            Ok(body) => match body.get("status").and_then(|s| s.as_str()) {
                Some(status) => format!("Service reachable ({status})"),
                None => "Service reachable".to_string(),
            },
            Err(e) => {
                warn!(error = %e, "health probe failed");
                cropdoc_core::human_errors::humanize_error(&e).message
            }
        };
        if let Ok(mut last) = self.last_health.lock() {
            *last = Some(summary.clone());
        }
        summary
    }

    /// Result of the most recent health probe, if any ran.
    pub fn last_health(&self) -> Option<String> {
        self.last_health.lock().ok().and_then(|h| h.clone())
    }
}

// Equal when both handles came from the same `init`.
impl PartialEq for AppServices {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.config, &other.config)
    }
}

// -- Config file persistence -------------------------------------------------

const CONFIG_FILE: &str = "config.json";

fn load_config(data_dir: &Path) -> Option<AppConfig> {
    let path = data_dir.join(CONFIG_FILE);
    let data = std::fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&data) {
        Ok(config) => Some(config),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring unreadable config");
            None
        }
    }
}
