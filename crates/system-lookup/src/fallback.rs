//! Fallback resolution through the helper library's pointer array.
//!
//! The helper exports `funcs`: one function pointer per
//! [`FallbackTable`] ordinal, in ordinal order, followed by a null
//! terminator. Slot `i` lives at `funcs + i * size_of::<*const c_void>()`.
//! The array is static in the helper, so it is read once at construction.

use std::ffi::c_void;
use std::path::Path;

use syslookup_core::FallbackTable;
use syslookup_core::fallback::{FALLBACK_ARRAY_CSYMBOL, FALLBACK_ARRAY_SYMBOL};

use crate::error::LookupInitError;
use crate::loader::LibraryLoader;
use crate::lookup::SymbolLookup;
use crate::primary::LibraryLookup;
use crate::symbol::{Resolution, Symbol, SymbolName, SymbolOrigin};

pub struct FallbackLookup {
    table: &'static FallbackTable,
    slots: Box<[Symbol]>,
    helper: LibraryLookup,
}

impl FallbackLookup {
    /// Load the helper at `path` and snapshot its pointer array.
    ///
    /// # Safety
    ///
    /// The library at `path` must follow the helper ABI: its `funcs` export
    /// points at `table.len() + 1` readable pointer slots.
    pub unsafe fn open(
        loader: &dyn LibraryLoader,
        path: &Path,
        table: &'static FallbackTable,
    ) -> Result<Self, LookupInitError> {
        let helper = LibraryLookup::open(loader, path)?;
        // SAFETY: forwarded from the caller.
        unsafe { Self::from_helper(helper, table) }
    }

    /// Snapshot the pointer array exported by an already loaded helper.
    ///
    /// # Safety
    ///
    /// Same contract as [`FallbackLookup::open`].
    pub unsafe fn from_helper(
        helper: LibraryLookup,
        table: &'static FallbackTable,
    ) -> Result<Self, LookupInitError> {
        let base = helper
            .export(FALLBACK_ARRAY_CSYMBOL)
            .ok_or_else(|| LookupInitError::MissingExport {
                library: helper.path().to_path_buf(),
                symbol: FALLBACK_ARRAY_SYMBOL,
            })?;
        // SAFETY: the caller guarantees `table.len() + 1` slots at `base`; the
        // helper stays loaded for the life of the process.
        let slots = unsafe { read_slots(base, table)? };
        Ok(Self {
            table,
            slots,
            helper,
        })
    }

    #[must_use]
    pub fn helper_path(&self) -> &Path {
        self.helper.path()
    }

    #[must_use]
    pub fn table(&self) -> &'static FallbackTable {
        self.table
    }
}

impl std::fmt::Debug for FallbackLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackLookup")
            .field("helper", &self.helper.path())
            .field("slots", &self.slots.len())
            .finish()
    }
}

impl SymbolLookup for FallbackLookup {
    fn resolve(&self, name: &SymbolName<'_>) -> Option<Resolution> {
        let ordinal = self.table.ordinal_of(name.as_str())?;
        self.slots.get(ordinal).map(|&symbol| Resolution {
            symbol,
            origin: SymbolOrigin::Fallback { ordinal },
        })
    }
}

/// Read every ordinal slot and check the terminator.
///
/// # Safety
///
/// `base` must point at `table.len() + 1` readable, pointer-aligned slots.
unsafe fn read_slots(
    base: Symbol,
    table: &FallbackTable,
) -> Result<Box<[Symbol]>, LookupInitError> {
    let array = base.as_ptr().cast::<*const c_void>();
    let mut slots = Vec::with_capacity(table.len());
    for slot in table.slots() {
        // SAFETY: ordinal < table.len(), within the caller's guarantee.
        let entry = unsafe { array.add(slot.ordinal).read() };
        let symbol = Symbol::from_ptr(entry).ok_or(LookupInitError::FallbackSlotNull {
            ordinal: slot.ordinal,
            name: slot.name,
        })?;
        slots.push(symbol);
    }
    // SAFETY: the terminator slot is the last one the caller guarantees.
    let terminator = unsafe { array.add(table.len()).read() };
    if !terminator.is_null() {
        return Err(LookupInitError::FallbackUnterminated {
            expected: table.len(),
        });
    }
    Ok(slots.into_boxed_slice())
}
