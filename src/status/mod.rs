// src/status/mod.rs

//! Status inference from task output.
//!
//! - [`matcher`] maps a plain-text log and an ordered list of
//!   `pattern -> status` rules to the task's current status.
//! - [`strip`] turns raw output chunks into text, incrementally and safely
//!   across chunk boundaries.
//! - [`log`] keeps the raw and stripped views of a task's log together.

pub mod log;
pub mod matcher;
pub mod strip;

pub use log::LogBuffer;
pub use matcher::{StatusMatcher, compute_status};
pub use strip::{AnsiStripper, Utf8Carry, strip_all};
