//! Binding model for wheel, pedal and shifter inputs
//!
//! [`Controls`] holds one entry per action for the lifetime of the process,
//! the H-shifter gear table and the curated device list used when writing
//! the simulator's controls file.
//!
//! Axis indices are 0-based inside this crate ([`AxisIndex`]). Requests and
//! summaries number axes from 1 and convert at the boundary.
//!
//! ```
//! use openracing_bindings::{AxisIndex, BindRequest, Controls};
//!
//! let mut controls = Controls::new();
//! let bound = controls.bind(&BindRequest::axis("THROTTLE", 0, 2));
//! assert!(bound.is_ok());
//! assert_eq!(controls.throttle.binding(), Some((0, AxisIndex::new(1))));
//! assert!(controls.is_controller_in_use(0));
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod action;
pub mod controls;
pub mod devices;
pub mod entry;
pub mod key_code;
pub mod request;
pub mod shifter;
pub mod summary;

pub use action::{Action, GEAR_COUNT, Gear, InputKind, UnbindTarget};
pub use controls::{Controls, EntryRef, InputMethod};
pub use devices::{CuratedDevice, DeviceList};
pub use entry::{
    AxisEntry, AxisIndex, AxisTuning, ButtonEntry, RangeTuning, RotationTuning,
    fraction_to_percent, percent_to_signed, signed_to_percent,
};
pub use key_code::{KeyCode, parse_optional_key};
pub use request::{BindRequest, BoundInput, HShifterRequest, SequentialRequest, ValidatedBind};
pub use shifter::ShifterTable;
pub use summary::{ActionBindings, ActionState, BindingInfo, ControlsSummary, DeviceState, ShifterState};

/// Which kind of input detection looks for.
pub type DetectionKind = InputKind;

/// Results of registry operations that can fail for more than one reason.
pub type BindingsResult<T> = openracing_errors::Result<T>;
