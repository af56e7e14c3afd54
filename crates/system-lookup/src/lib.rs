//! # system-lookup
//!
//! Resolves C runtime symbols for a foreign-function layer without the
//! caller naming or loading any library.
//!
//! # Architecture
//!
//! ```text
//! find(name)
//!     │
//!     ▼
//! SystemLookup (OnceLock, built on first use)
//!     │
//!     ├── Ready ──► primary C runtime ──(absent)──► fallback table (Windows + UCRT)
//!     │
//!     └── Degraded ──► always absent
//! ```
//!
//! On POSIX the primary source is the bundled helper library: `dlsym` on its
//! handle also searches libc, libm and libdl, which it links. On Windows the
//! runtime DLL is loaded from `System32` directly; when that is
//! `ucrtbase.dll`, the `printf`/`scanf` families are missing from its export
//! table and are served from the helper's `funcs` pointer array instead.
//!
//! Initialization never fails loudly. If anything in the chain goes wrong the
//! facade degrades to a lookup that finds nothing, and the cause is kept for
//! [`SystemLookup::status`].

pub mod config;
pub mod error;
pub mod facade;
pub mod fallback;
pub mod loader;
pub mod log;
pub mod lookup;
pub mod primary;
pub mod symbol;
#[cfg(feature = "testing")]
pub mod testing;

pub use config::LookupConfig;
pub use error::{LookupInitError, SymbolNameError};
pub use facade::{LookupStatus, SystemLookup, SystemLookupState, find};
pub use loader::{LibraryLoader, LoadedLibrary, NativeLoader};
pub use lookup::{CompositeLookup, ResolvedLookup, SymbolLookup};
pub use primary::{CRuntime, LibraryLookup};
pub use symbol::{Resolution, Symbol, SymbolName, SymbolOrigin};
pub use syslookup_core::Platform;
