//! Input detection and binding service
//!
//! Ties the binding model to live devices. [`DetectionManager`] runs one
//! background scan per requested action and binds whatever the user moves or
//! presses; [`BindingService`] covers explicit binds, unbinds and device list
//! edits. Both share the model through [`AppContext`] and save it through a
//! [`StateStore`] after every change.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use openracing_input_source::ScriptedSource;
//! use racing_wheel_binder::{AppContext, BinderConfig, DeviceScope, MemoryStateStore};
//!
//! # async fn run() -> openracing_errors::Result<()> {
//! let ctx = AppContext::new(
//!     BinderConfig::default(),
//!     Arc::new(ScriptedSource::new(Vec::new())),
//!     Arc::new(MemoryStateStore::new()),
//! )
//! .await;
//! let session = ctx.detection.start("THROTTLE", DeviceScope::All, None).await?;
//! if let Some(id) = session.session_id {
//!     let done = ctx.detection.wait(id).await;
//!     println!("{:?}", done.map(|s| s.status_message));
//! }
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod context;
pub mod detection;
pub mod scan;
pub mod service;
pub mod session;
pub mod state;

pub use config::{BinderConfig, DetectionConfig, PathsConfig, SCHEMA_VERSION};
pub use context::{AppContext, SharedControls};
pub use detection::DetectionManager;
pub use service::BindingService;
pub use session::{DeviceScope, NO_SESSION_MESSAGE, ScanOutcome, SessionStatus};
pub use state::{
    ApplicationState, JsonStateStore, MemoryStateStore, RecentSelection, StatePersistence,
    StateStore,
};
