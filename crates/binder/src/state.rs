//! Application state persistence
//!
//! The state file holds the binding model and the last selections made in
//! the launcher. Saving never fails the caller: errors are logged and the
//! in-memory model stays authoritative.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use openracing_bindings::Controls;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::context::SharedControls;

/// Launcher selections restored on the next start.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecentSelection {
    pub last_car: Option<String>,
    pub last_track: Option<String>,
    pub last_nick: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationState {
    pub controls: Controls,
    #[serde(flatten)]
    pub recent: RecentSelection,
}

#[async_trait]
pub trait StateStore: Send + Sync {
    async fn save(&self, state: &ApplicationState);

    /// Stored state, or the default when nothing usable is stored.
    async fn load(&self) -> ApplicationState;
}

/// JSON file store. Each write goes to its own temporary file next to the
/// target, which is then renamed over it.
#[derive(Debug, Clone)]
pub struct JsonStateStore {
    path: PathBuf,
}

impl JsonStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn write(&self, state: &ApplicationState) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(state).map_err(std::io::Error::other)?;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let temp = self.temp_path();
        let written = async {
            tokio::fs::write(&temp, json).await?;
            tokio::fs::rename(&temp, &self.path).await
        }
        .await;
        if written.is_err()
            && let Err(e) = tokio::fs::remove_file(&temp).await
            && e.kind() != std::io::ErrorKind::NotFound
        {
            debug!(path = ?temp, error = %e, "Failed to remove temporary state file");
        }
        written
    }

    /// `state.json` becomes `state.<uuid>.tmp` in the same directory.
    fn temp_path(&self) -> PathBuf {
        self.path
            .with_extension(format!("{}.tmp", Uuid::new_v4().simple()))
    }
}

#[async_trait]
impl StateStore for JsonStateStore {
    async fn save(&self, state: &ApplicationState) {
        match self.write(state).await {
            Ok(()) => debug!(path = ?self.path, "State saved"),
            Err(e) => warn!(path = ?self.path, error = %e, "Failed to save state"),
        }
    }

    async fn load(&self) -> ApplicationState {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = ?self.path, "No saved state, starting fresh");
                return ApplicationState::default();
            }
            Err(e) => {
                warn!(path = ?self.path, error = %e, "Failed to read state");
                return ApplicationState::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(state) => {
                debug!(path = ?self.path, "State loaded");
                state
            }
            Err(e) => {
                warn!(path = ?self.path, error = %e, "Ignoring corrupt state file");
                ApplicationState::default()
            }
        }
    }
}

/// Keeps the last saved state in memory.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    saved: Mutex<Option<ApplicationState>>,
    saves: Mutex<usize>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: ApplicationState) -> Self {
        Self {
            saved: Mutex::new(Some(state)),
            saves: Mutex::new(0),
        }
    }

    pub fn saved(&self) -> Option<ApplicationState> {
        self.saved.lock().clone()
    }

    pub fn save_count(&self) -> usize {
        *self.saves.lock()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn save(&self, state: &ApplicationState) {
        *self.saved.lock() = Some(state.clone());
        let mut saves = self.saves.lock();
        *saves = saves.saturating_add(1);
    }

    async fn load(&self) -> ApplicationState {
        self.saved().unwrap_or_default()
    }
}

/// Saves the current binding model together with the recent selections.
///
/// Saves are serialized: a later snapshot is never overwritten by an earlier
/// one.
pub struct StatePersistence {
    store: Arc<dyn StateStore>,
    controls: SharedControls,
    recent: Mutex<RecentSelection>,
    save_lock: tokio::sync::Mutex<()>,
}

impl StatePersistence {
    pub fn new(store: Arc<dyn StateStore>, controls: SharedControls, recent: RecentSelection) -> Self {
        Self {
            store,
            controls,
            recent: Mutex::new(recent),
            save_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn recent(&self) -> RecentSelection {
        self.recent.lock().clone()
    }

    pub async fn set_recent(&self, recent: RecentSelection) {
        *self.recent.lock() = recent;
        self.persist().await;
    }

    /// Snapshot the model and hand it to the store. The model locks are
    /// released before the store is awaited; the save lock is held from the
    /// snapshot until the store returns.
    pub async fn persist(&self) {
        let _saving = self.save_lock.lock().await;
        let state = ApplicationState {
            controls: self.controls.lock().clone(),
            recent: self.recent(),
        };
        self.store.save(&state).await;
    }
}

impl std::fmt::Debug for StatePersistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatePersistence")
            .field("recent", &*self.recent.lock())
            .finish_non_exhaustive()
    }
}
