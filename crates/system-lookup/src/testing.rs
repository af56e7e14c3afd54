//! In-memory libraries for tests and benchmarks.
//!
//! [`ScriptedLoader`] maps paths to [`ScriptedLibrary`] export tables and
//! records every load, so the Windows branches run on any host.
//! [`fake_funcs`] builds a helper `funcs` image with known slot addresses.

use std::collections::HashMap;
use std::ffi::{CStr, CString};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use syslookup_core::fallback::{FALLBACK_ARRAY_SYMBOL, UCRT_FALLBACK_SYMBOLS};

use crate::error::LookupInitError;
use crate::loader::{LibraryLoader, LoadedLibrary};
use crate::symbol::Symbol;

/// Slots in a helper `funcs` image, terminator included.
pub const FAKE_FUNCS_LEN: usize = UCRT_FALLBACK_SYMBOLS.len() + 1;

/// Address stored in slot 0 of a fake `funcs` image.
pub const FAKE_SLOT_BASE: usize = 0x7000_0000;

/// Address [`fake_funcs`] stores at `ordinal`.
#[must_use]
pub const fn fake_slot_addr(ordinal: usize) -> usize {
    FAKE_SLOT_BASE + ordinal * 0x10
}

/// A `funcs` image: every ordinal filled except `null_at`, then `terminator`.
#[must_use]
pub const fn fake_funcs(null_at: Option<usize>, terminator: usize) -> [usize; FAKE_FUNCS_LEN] {
    let mut funcs = [0_usize; FAKE_FUNCS_LEN];
    let mut i = 0;
    while i < FAKE_FUNCS_LEN - 1 {
        funcs[i] = match null_at {
            Some(null) if null == i => 0,
            _ => fake_slot_addr(i),
        };
        i += 1;
    }
    funcs[FAKE_FUNCS_LEN - 1] = terminator;
    funcs
}

/// A library answering from a fixed export table.
#[derive(Debug, Clone, Default)]
pub struct ScriptedLibrary {
    exports: HashMap<CString, Symbol>,
}

impl ScriptedLibrary {
    /// Add `name` at `addr`. Names with a NUL byte or a zero address are
    /// ignored.
    #[must_use]
    pub fn export(mut self, name: &str, addr: usize) -> Self {
        if let (Ok(name), Some(symbol)) = (CString::new(name), Symbol::from_addr(addr)) {
            self.exports.insert(name, symbol);
        }
        self
    }

    /// A helper library exporting `funcs` at the start of `image`.
    #[must_use]
    pub fn helper(image: &'static [usize; FAKE_FUNCS_LEN]) -> Self {
        Self::default().export(FALLBACK_ARRAY_SYMBOL, image.as_ptr() as usize)
    }
}

impl LoadedLibrary for ScriptedLibrary {
    fn lookup(&self, name: &CStr) -> Option<Symbol> {
        self.exports.get(name).copied()
    }
}

/// Loader serving [`ScriptedLibrary`] values by exact path.
#[derive(Debug, Default)]
pub struct ScriptedLoader {
    libraries: HashMap<PathBuf, ScriptedLibrary>,
    loads: Arc<Mutex<Vec<PathBuf>>>,
}

impl ScriptedLoader {
    #[must_use]
    pub fn with(mut self, path: impl Into<PathBuf>, library: ScriptedLibrary) -> Self {
        self.libraries.insert(path.into(), library);
        self
    }

    /// Paths passed to `load`, in call order.
    #[must_use]
    pub fn loaded(&self) -> Vec<PathBuf> {
        self.loads.lock().clone()
    }
}

impl LibraryLoader for ScriptedLoader {
    fn load(&self, path: &Path) -> Result<Box<dyn LoadedLibrary>, LookupInitError> {
        self.loads.lock().push(path.to_path_buf());
        self.libraries
            .get(path)
            .cloned()
            .map(|lib| Box::new(lib) as Box<dyn LoadedLibrary>)
            .ok_or_else(|| LookupInitError::Load {
                path: path.to_path_buf(),
                reason: "not scripted".to_string(),
            })
    }

    fn exists(&self, path: &Path) -> bool {
        self.libraries.contains_key(path)
    }
}
