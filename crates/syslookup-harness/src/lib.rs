//! Diagnostics harness for system-lookup.
//!
//! This crate provides:
//! - Status reports: how the process-wide lookup was built, or why it degraded
//! - Table dumps: the fallback catalogue in helper slot order
//! - Symbol probes: resolve names through the system lookup or the process image

#![forbid(unsafe_code)]

pub mod report;

pub use report::{HarnessError, ProbeReport, ProbeSource, StatusReport, TableReport};
