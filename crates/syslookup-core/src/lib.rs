//! # syslookup-core
//!
//! Safe, loader-free building blocks for system symbol lookup:
//!
//! - [`platform`]: one-shot OS family probe.
//! - [`fallback`]: the fixed catalogue of C runtime entry points that the
//!   Windows universal CRT only provides inline.
//! - [`layout`]: helper library naming and installation directories.
//!
//! Everything that touches a native loader or the process environment lives
//! in `system-lookup`.

pub mod fallback;
pub mod layout;
pub mod platform;

pub use fallback::{FallbackSlot, FallbackTable};
pub use platform::Platform;
