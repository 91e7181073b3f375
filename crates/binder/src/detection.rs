//! Detection session manager
//!
//! One registry lock guards every session record and cancel flag. The
//! binding model has its own lock; when both are needed the registry lock is
//! taken first. Neither is held across an await.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use openracing_bindings::{Action, BoundInput};
use openracing_change_detect::DetectionTiming;
use openracing_errors::{ConfigurationError, ConflictError, DeviceError};
use openracing_input_source::InputSource;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::context::SharedControls;
use crate::scan::{Scan, ScanTarget};
use crate::session::{DeviceScope, ScanOutcome, SessionStatus, format_timeout};
use crate::state::StatePersistence;

#[derive(Default)]
struct Registry {
    sessions: HashMap<Uuid, SessionStatus>,
    cancels: HashMap<Uuid, Arc<AtomicBool>>,
    /// Session ids in start order.
    started: Vec<Uuid>,
}

impl Registry {
    fn latest(&self, action: Action) -> Option<&SessionStatus> {
        self.started
            .iter()
            .rev()
            .filter_map(|id| self.sessions.get(id))
            .find(|status| status.action == action.name())
    }

    fn active(&self, action: Action) -> Option<&SessionStatus> {
        self.latest(action).filter(|status| status.is_active())
    }

    /// Mark a listening session cancelled and raise its flag.
    fn cancel(&mut self, id: Uuid) -> Option<SessionStatus> {
        let status = self.sessions.get_mut(&id)?;
        if status.is_active() {
            if let Some(flag) = self.cancels.get(&id) {
                flag.store(true, Ordering::SeqCst);
            }
            status.cancel();
            info!(action = %status.action, session_id = %id, "Detection cancelled");
        }
        Some(status.clone())
    }
}

struct Inner {
    registry: Mutex<Registry>,
    tasks: Mutex<HashMap<Uuid, JoinHandle<()>>>,
    controls: SharedControls,
    source: Arc<dyn InputSource>,
    persistence: Arc<StatePersistence>,
    timing: DetectionTiming,
}

/// Starts, tracks and cancels detection sessions.
#[derive(Clone)]
pub struct DetectionManager {
    inner: Arc<Inner>,
}

impl DetectionManager {
    pub fn new(
        controls: SharedControls,
        source: Arc<dyn InputSource>,
        persistence: Arc<StatePersistence>,
        timing: DetectionTiming,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry: Mutex::new(Registry::default()),
                tasks: Mutex::new(HashMap::new()),
                controls,
                source,
                persistence,
                timing,
            }),
        }
    }

    pub fn timing(&self) -> &DetectionTiming {
        &self.inner.timing
    }

    /// Start listening for `action`. Returns as soon as the scan task is
    /// spawned; the returned status is `listening`.
    ///
    /// # Errors
    ///
    /// Configuration errors for an unknown action, a zero timeout or a device
    /// index outside the current enumeration; a device error when nothing is
    /// attached; a conflict when the action already has a listening session.
    pub async fn start(
        &self,
        action: &str,
        scope: DeviceScope,
        timeout: Option<Duration>,
    ) -> openracing_errors::Result<SessionStatus> {
        let action: Action = action.parse()?;
        let timeout = timeout.unwrap_or(self.inner.timing.default_timeout);
        if timeout.is_zero() {
            return Err(ConfigurationError::invalid_setting("timeout", "must be greater than zero").into());
        }

        if let Some(active) = self.inner.registry.lock().active(action) {
            debug!(action = %action, session_id = ?active.session_id, "Rejecting second session");
            return Err(ConflictError::session_active(action.name()).into());
        }

        let devices = self.inner.source.enumerate().await?;
        if devices.is_empty() {
            return Err(DeviceError::NoDevices.into());
        }
        let target = match scope {
            DeviceScope::Device(index) => {
                let descriptor = devices.get(index).cloned().ok_or(DeviceError::InvalidIndex {
                    index,
                    available: devices.len(),
                })?;
                ScanTarget::Single { index, descriptor }
            }
            DeviceScope::All => ScanTarget::All(devices),
        };

        let id = Uuid::new_v4();
        let cancel = Arc::new(AtomicBool::new(false));
        let status = SessionStatus::listening(id, action, scope, timeout);
        {
            let mut registry = self.inner.registry.lock();
            // Enumeration awaited without the lock; re-check.
            if registry.active(action).is_some() {
                return Err(ConflictError::session_active(action.name()).into());
            }
            registry.sessions.insert(id, status.clone());
            registry.cancels.insert(id, Arc::clone(&cancel));
            registry.started.push(id);
        }
        info!(action = %action, session_id = %id, scope = %scope, timeout = %format_timeout(timeout), "Detection started");

        let scan = Scan {
            source: Arc::clone(&self.inner.source),
            timing: self.inner.timing,
            kind: action.input_kind(),
            timeout,
            cancel,
        };
        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            let outcome = scan.run(target).await;
            inner.finish(id, action, timeout, outcome).await;
            inner.tasks.lock().remove(&id);
        });
        {
            let mut tasks = self.inner.tasks.lock();
            // Scans that ended before their handle was stored.
            tasks.retain(|_, task| !task.is_finished());
            tasks.insert(id, handle);
        }

        Ok(status)
    }

    /// Most recently started session for `action`.
    pub fn status(&self, action: Action) -> SessionStatus {
        self.inner
            .registry
            .lock()
            .latest(action)
            .cloned()
            .unwrap_or_else(|| SessionStatus::none(action))
    }

    pub fn session(&self, id: Uuid) -> Option<SessionStatus> {
        self.inner.registry.lock().sessions.get(&id).cloned()
    }

    /// Cancel a session by id. Cancelling a finished session changes nothing.
    ///
    /// # Errors
    ///
    /// [`ConflictError::SessionNotFound`] for an unknown id.
    pub fn cancel(&self, id: Uuid) -> Result<SessionStatus, ConflictError> {
        self.inner
            .registry
            .lock()
            .cancel(id)
            .ok_or_else(|| ConflictError::SessionNotFound(id.to_string()))
    }

    /// Cancel the listening session of `action`, if there is one.
    pub fn cancel_action(&self, action: Action) -> Option<SessionStatus> {
        let mut registry = self.inner.registry.lock();
        let id = registry.active(action)?.session_id?;
        registry.cancel(id)
    }

    /// Scan tasks that have not finished or been awaited yet.
    pub fn pending_tasks(&self) -> usize {
        self.inner.tasks.lock().len()
    }

    /// Wait for a session's scan task to exit and return its final status.
    pub async fn wait(&self, id: Uuid) -> Option<SessionStatus> {
        let handle = self.inner.tasks.lock().remove(&id);
        if let Some(handle) = handle
            && let Err(e) = handle.await
        {
            warn!(session_id = %id, error = %e, "Detection task failed");
        }
        self.session(id)
    }

    /// Cancel every listening session and wait for the scans to exit.
    pub async fn shutdown(&self) -> usize {
        let cancelled = {
            let mut registry = self.inner.registry.lock();
            let active: Vec<Uuid> = registry
                .sessions
                .iter()
                .filter(|(_, status)| status.is_active())
                .map(|(id, _)| *id)
                .collect();
            for id in &active {
                registry.cancel(*id);
            }
            active.len()
        };

        let handles: Vec<(Uuid, JoinHandle<()>)> = self.inner.tasks.lock().drain().collect();
        for (id, handle) in handles {
            if let Err(e) = handle.await {
                warn!(session_id = %id, error = %e, "Detection task failed");
            }
        }
        info!(cancelled, "Detection manager stopped");
        cancelled
    }
}

impl Inner {
    async fn finish(&self, id: Uuid, action: Action, timeout: Duration, outcome: ScanOutcome) {
        let bound = {
            let mut registry = self.registry.lock();
            registry.cancels.remove(&id);
            let Some(status) = registry.sessions.get_mut(&id) else {
                return;
            };
            if !status.is_active() {
                debug!(action = %action, session_id = %id, "Scan ended after cancel");
                return;
            }

            match outcome {
                ScanOutcome::Detected(detection) => {
                    let applied = {
                        let mut controls = self.controls.lock();
                        match detection.input {
                            BoundInput::Axis(axis) => {
                                controls.assign_axis(action, detection.controller, axis)
                            }
                            BoundInput::Button(button) => {
                                controls.assign_button(action, detection.controller, button)
                            }
                        }
                    };
                    if applied {
                        status.complete_success(&detection);
                        info!(
                            action = %action,
                            session_id = %id,
                            controller = detection.controller,
                            input = ?detection.input,
                            "Input detected and bound"
                        );
                    } else {
                        status.complete_failure(format!("{action} cannot be bound to the detected input"));
                    }
                    applied
                }
                ScanOutcome::TimedOut => {
                    status.complete_failure(format!(
                        "No input detected for {action} within {}",
                        format_timeout(timeout)
                    ));
                    info!(action = %action, session_id = %id, "Detection timed out");
                    false
                }
                ScanOutcome::Cancelled => {
                    status.cancel();
                    false
                }
                ScanOutcome::Failed(reason) => {
                    warn!(action = %action, session_id = %id, %reason, "Detection failed");
                    status.complete_failure(reason);
                    false
                }
            }
        };

        if bound {
            self.persistence.persist().await;
        }
    }
}

impl std::fmt::Debug for DetectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.inner.registry.lock();
        f.debug_struct("DetectionManager")
            .field("sessions", &registry.sessions.len())
            .field("pending_tasks", &self.pending_tasks())
            .field("timing", &self.inner.timing)
            .finish_non_exhaustive()
    }
}
