//! Change detection for input binding
//!
//! Pure state machines that turn a stream of polled snapshots into "this axis
//! moved" or "this button was pressed and released". They never touch a
//! device; the caller polls, feeds values in, and waits the delay a detector
//! asks for before the next poll.
//!
//! - [`AxisTracker`]: tick-to-tick deltas against a fine epsilon, used when a
//!   single device is scanned.
//! - [`BaselineAxisTracker`] and [`AxisCandidate`]: changes against a fixed
//!   session-start baseline with coarser thresholds, used when every attached
//!   device is scanned at once.
//! - [`ButtonPressDetector`]: press, confirm on re-poll, wait for release.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod axis;
pub mod button;
pub mod timing;

pub use axis::*;
pub use button::*;
pub use timing::*;
