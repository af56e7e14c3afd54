//! Symbol names and resolved addresses.

use std::ffi::{CStr, CString, c_void};
use std::fmt;
use std::num::NonZeroUsize;

use crate::error::SymbolNameError;

/// Absolute address of a resolved symbol. Never null.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(NonZeroUsize);

impl Symbol {
    #[must_use]
    pub fn from_addr(addr: usize) -> Option<Self> {
        NonZeroUsize::new(addr).map(Self)
    }

    #[must_use]
    pub fn from_ptr(ptr: *const c_void) -> Option<Self> {
        Self::from_addr(ptr as usize)
    }

    #[must_use]
    pub const fn addr(self) -> usize {
        self.0.get()
    }

    #[must_use]
    pub fn as_ptr(self) -> *const c_void {
        self.0.get() as *const c_void
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({:#x})", self.addr())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.addr())
    }
}

/// A validated symbol name: non-empty, no interior NUL.
///
/// Keeps the caller's `&str` for table lookups and a NUL-terminated copy for
/// the native loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolName<'a> {
    name: &'a str,
    c_name: CString,
}

impl<'a> SymbolName<'a> {
    pub fn new(name: &'a str) -> Result<Self, SymbolNameError> {
        if name.is_empty() {
            return Err(SymbolNameError::Empty);
        }
        let c_name = CString::new(name).map_err(|e| SymbolNameError::InteriorNul {
            position: e.nul_position(),
        })?;
        Ok(Self { name, c_name })
    }

    #[must_use]
    pub fn as_str(&self) -> &'a str {
        self.name
    }

    #[must_use]
    pub fn as_c_str(&self) -> &CStr {
        &self.c_name
    }
}

/// Where a hit came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolOrigin {
    /// Exported directly by a loaded library.
    Library,
    /// Served from the helper's pointer array at `ordinal`.
    Fallback { ordinal: usize },
}

/// A hit together with its origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub symbol: Symbol,
    pub origin: SymbolOrigin,
}
