//! Primary C runtime resolution.
//!
//! POSIX: the helper library links libc, libm and libdl, and `dlsym` on its
//! handle searches those dependencies too, so the C library never has to be
//! named or located.
//!
//! Windows: loaders only search a module's own exports, so the runtime DLL is
//! loaded from `System32` by name. `ucrtbase.dll` is preferred; `msvcrt.dll`
//! is used when the universal CRT is not installed.

use std::ffi::CStr;
use std::path::{Path, PathBuf};

use serde::Serialize;
use syslookup_core::{Platform, layout};

use crate::config::LookupConfig;
use crate::error::LookupInitError;
use crate::loader::{LibraryLoader, LoadedLibrary};
use crate::lookup::SymbolLookup;
use crate::symbol::{Resolution, Symbol, SymbolName, SymbolOrigin};

/// Which C runtime backs the primary lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CRuntime {
    /// POSIX libc seen through the helper library.
    SideLibrary,
    /// Windows universal CRT (`ucrtbase.dll`).
    Ucrt,
    /// Legacy Windows CRT (`msvcrt.dll`).
    Msvcrt,
}

impl CRuntime {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SideLibrary => "side_library",
            Self::Ucrt => "ucrt",
            Self::Msvcrt => "msvcrt",
        }
    }

    /// Whether the runtime leaves out symbols that the fallback table covers.
    #[must_use]
    pub const fn needs_fallback(self) -> bool {
        matches!(self, Self::Ucrt)
    }
}

/// A loaded library answering lookups from its export table.
pub struct LibraryLookup {
    library: Box<dyn LoadedLibrary>,
    path: PathBuf,
}

impl LibraryLookup {
    pub fn open(loader: &dyn LibraryLoader, path: &Path) -> Result<Self, LookupInitError> {
        let library = loader.load(path)?;
        Ok(Self::from_library(library, path.to_path_buf()))
    }

    #[must_use]
    pub fn from_library(library: Box<dyn LoadedLibrary>, path: PathBuf) -> Self {
        Self { library, path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw export lookup.
    #[must_use]
    pub fn export(&self, name: &CStr) -> Option<Symbol> {
        self.library.lookup(name)
    }
}

impl std::fmt::Debug for LibraryLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibraryLookup")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SymbolLookup for LibraryLookup {
    fn resolve(&self, name: &SymbolName<'_>) -> Option<Resolution> {
        self.export(name.as_c_str()).map(|symbol| Resolution {
            symbol,
            origin: SymbolOrigin::Library,
        })
    }
}

/// Pick the runtime library for `platform` without loading it.
pub fn select_runtime(
    platform: Platform,
    config: &LookupConfig,
    loader: &dyn LibraryLoader,
) -> Result<(CRuntime, PathBuf), LookupInitError> {
    match platform {
        Platform::Posix => Ok((CRuntime::SideLibrary, config.helper_path(platform)?)),
        Platform::Windows => {
            let system32 = layout::system32_dir(config.system_root()?);
            let ucrt = system32.join(layout::UCRT_DLL);
            if loader.exists(&ucrt) {
                Ok((CRuntime::Ucrt, ucrt))
            } else {
                Ok((CRuntime::Msvcrt, system32.join(layout::MSVCRT_DLL)))
            }
        }
    }
}

/// Select and load the primary runtime for `platform`.
pub fn open_primary(
    platform: Platform,
    config: &LookupConfig,
    loader: &dyn LibraryLoader,
) -> Result<(CRuntime, LibraryLookup), LookupInitError> {
    let (runtime, path) = select_runtime(platform, config, loader)?;
    let lookup = LibraryLookup::open(loader, &path)?;
    Ok((runtime, lookup))
}
