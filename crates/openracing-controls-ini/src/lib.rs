//! Reader and writer for the simulator's `controls.ini`
//!
//! The file is a flat INI document. Axes are written 0-based (`AXLE`),
//! controller references (`JOY`) are positions in the `[CONTROLLERS]` list,
//! and `-1` marks anything unbound. Pedal travel is written as signed
//! `MIN`/`MAX` values in `-1..=1`.
//!
//! Writing and reading back a file and writing it again produces the same
//! text.
//!
//! ```
//! use openracing_bindings::{Action, AxisIndex, Controls};
//! use openracing_controls_ini::{deserialize_controls, serialize_controls};
//!
//! let mut controls = Controls::new();
//! controls.assign_axis(Action::Brakes, 0, AxisIndex::new(1));
//! let text = serialize_controls(&controls);
//! assert!(text.contains("[BRAKES]\nJOY=0\nAXLE=1\n"));
//!
//! let loaded = deserialize_controls(&text);
//! assert_eq!(serialize_controls(&loaded), text);
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod document;
pub mod file;
pub mod reader;
pub mod value;
pub mod writer;

pub use document::{IniDocument, Section};
pub use file::{ControlsFileError, read_controls, write_controls};
pub use reader::{controls_from_document, deserialize_controls};
pub use value::normalize_value;
pub use writer::{IniWriter, UNMANAGED_ACTIONS, serialize_controls};

/// File name the simulator reads bindings from.
pub const CONTROLS_FILE_NAME: &str = "controls.ini";
