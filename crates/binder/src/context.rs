//! Application context
//!
//! Built once by the entry point and handed to every component that needs
//! the shared binding model, the device source or the session manager.

use std::sync::Arc;

use openracing_bindings::Controls;
use openracing_input_source::InputSource;
use parking_lot::Mutex;
use tracing::info;

use crate::config::BinderConfig;
use crate::detection::DetectionManager;
use crate::service::BindingService;
use crate::state::{StatePersistence, StateStore};

/// Binding model shared by explicit binds and detection sessions.
pub type SharedControls = Arc<Mutex<Controls>>;

pub struct AppContext {
    pub config: BinderConfig,
    pub controls: SharedControls,
    pub source: Arc<dyn InputSource>,
    pub persistence: Arc<StatePersistence>,
    pub detection: DetectionManager,
}

impl AppContext {
    /// Restore the stored state and wire the components together.
    pub async fn new(
        config: BinderConfig,
        source: Arc<dyn InputSource>,
        store: Arc<dyn StateStore>,
    ) -> Self {
        let state = store.load().await;
        info!(
            devices = state.controls.devices.len(),
            last_car = ?state.recent.last_car,
            "Bindings restored"
        );

        let controls: SharedControls = Arc::new(Mutex::new(state.controls));
        let persistence = Arc::new(StatePersistence::new(
            store,
            Arc::clone(&controls),
            state.recent,
        ));
        let detection = DetectionManager::new(
            Arc::clone(&controls),
            Arc::clone(&source),
            Arc::clone(&persistence),
            config.detection.timing(),
        );

        Self {
            config,
            controls,
            source,
            persistence,
            detection,
        }
    }

    pub fn bindings(&self) -> BindingService {
        BindingService::new(
            Arc::clone(&self.controls),
            Arc::clone(&self.source),
            Arc::clone(&self.persistence),
        )
    }

    /// Copy of the current binding model.
    pub fn controls_snapshot(&self) -> Controls {
        self.controls.lock().clone()
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("config", &self.config)
            .field("detection", &self.detection)
            .finish_non_exhaustive()
    }
}
