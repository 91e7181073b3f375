//! Explicit binding operations
//!
//! Every successful mutation is followed by a save. The model lock is
//! released before saving.

use std::path::Path;
use std::sync::Arc;

use openracing_bindings::{
    Action, ActionBindings, BindRequest, Controls, ControlsSummary, CuratedDevice, HShifterRequest,
    SequentialRequest, UnbindTarget, ValidatedBind,
};
use openracing_controls_ini::{read_controls, serialize_controls, write_controls};
use openracing_errors::Result;
use openracing_input_source::{DeviceDescriptor, InputSource};
use tracing::info;

use crate::context::SharedControls;
use crate::state::StatePersistence;

#[derive(Clone)]
pub struct BindingService {
    controls: SharedControls,
    source: Arc<dyn InputSource>,
    persistence: Arc<StatePersistence>,
}

impl BindingService {
    pub fn new(
        controls: SharedControls,
        source: Arc<dyn InputSource>,
        persistence: Arc<StatePersistence>,
    ) -> Self {
        Self {
            controls,
            source,
            persistence,
        }
    }

    /// Attached devices in discovery order.
    pub async fn devices(&self) -> Result<Vec<DeviceDescriptor>> {
        Ok(self.source.enumerate().await?)
    }

    pub async fn bind(&self, request: &BindRequest) -> Result<ValidatedBind> {
        let bound = self.controls.lock().bind(request)?;
        self.persistence.persist().await;
        Ok(bound)
    }

    /// Returns the number of gears assigned.
    pub async fn bind_h_shifter(&self, request: &HShifterRequest) -> Result<usize> {
        let gears = self.controls.lock().bind_h_shifter(request)?;
        self.persistence.persist().await;
        Ok(gears)
    }

    pub async fn bind_sequential(&self, request: &SequentialRequest) -> Result<()> {
        self.controls.lock().bind_sequential(request)?;
        self.persistence.persist().await;
        Ok(())
    }

    /// Unbind an action, or the whole shifter for `SHIFTER`/`H_SHIFTER`.
    /// Returns whether anything was bound.
    pub async fn unbind(&self, target: &str) -> Result<bool> {
        let target: UnbindTarget = target.parse()?;
        let was_bound = self.controls.lock().unbind(target);
        self.persistence.persist().await;
        Ok(was_bound)
    }

    /// Unbind by a summary binding id such as `THROTTLE_1` or `GEAR_R`.
    pub async fn unbind_binding(&self, binding_id: &str) -> Result<Action> {
        let action = self.controls.lock().unbind_binding(binding_id)?;
        self.persistence.persist().await;
        Ok(action)
    }

    pub async fn unbind_all(&self) {
        self.controls.lock().unbind_all();
        self.persistence.persist().await;
    }

    /// Replace the curated device list with the current enumeration.
    pub async fn use_devices(&self) -> Result<usize> {
        let devices = self.source.enumerate().await?;
        let count = {
            let mut controls = self.controls.lock();
            controls.set_devices(devices);
            controls.devices.len()
        };
        self.persistence.persist().await;
        Ok(count)
    }

    pub async fn remove_device(&self, guid: &str) -> Result<CuratedDevice> {
        let removed = self.controls.lock().remove_device(guid)?;
        self.persistence.persist().await;
        Ok(removed)
    }

    pub async fn remove_all_devices(&self) -> Result<usize> {
        let count = self.controls.lock().remove_all_devices()?;
        self.persistence.persist().await;
        Ok(count)
    }

    pub fn summary(&self) -> ControlsSummary {
        self.controls.lock().summary()
    }

    pub fn bindings(&self) -> Vec<ActionBindings> {
        self.controls.lock().bindings()
    }

    /// Controls file text for the current model.
    pub fn export_text(&self) -> String {
        serialize_controls(&self.controls.lock())
    }

    pub fn export_to(&self, path: &Path) -> Result<()> {
        let controls = self.controls.lock().clone();
        write_controls(path, &controls)?;
        Ok(())
    }

    /// Replace the model with the contents of a controls file.
    pub async fn import_from(&self, path: &Path) -> Result<()> {
        let imported: Controls = read_controls(path)?;
        info!(path = ?path, devices = imported.devices.len(), "Controls imported");
        *self.controls.lock() = imported;
        self.persistence.persist().await;
        Ok(())
    }
}

impl std::fmt::Debug for BindingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindingService").finish_non_exhaustive()
    }
}
