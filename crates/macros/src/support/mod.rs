//! Internal support utilities for the proc-macros.
//!
//! Diagnostics rendering and opt-in expansion logging.

pub mod diag;
pub mod log;
