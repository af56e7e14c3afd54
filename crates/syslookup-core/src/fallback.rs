//! Fallback symbol catalogue for the Windows universal CRT.
//!
//! `ucrtbase.dll` implements the `printf`/`scanf` families (and `gmtime`) as
//! inline header functions, so none of them show up in its export table. The
//! companion helper library re-exports out-of-line copies through a single
//! pointer array; this table maps each logical name to its slot in that
//! array.
//!
//! The order below IS the helper ABI. Ordinal `i` must name the function the
//! helper stores at `funcs[i]`, and the helper terminates the array with one
//! null slot at `funcs[len]`. A reordering on either side is silent
//! corruption, so the resolver verifies the terminator at startup.

use std::collections::HashMap;
use std::ffi::CStr;
use std::sync::OnceLock;

/// Symbols missing from `ucrtbase.dll`, in helper slot order.
pub const UCRT_FALLBACK_SYMBOLS: [&str; 52] = [
    // stdio
    "fprintf",
    "fprintf_s",
    "fscanf",
    "fscanf_s",
    "fwprintf",
    "fwprintf_s",
    "fwscanf",
    "fwscanf_s",
    "printf",
    "printf_s",
    "scanf",
    "scanf_s",
    "snprintf",
    "sprintf",
    "sprintf_s",
    "sscanf",
    "sscanf_s",
    "swprintf",
    "swprintf_s",
    "swscanf",
    "swscanf_s",
    "vfprintf",
    "vfprintf_s",
    "vfscanf",
    "vfscanf_s",
    "vfwprintf",
    "vfwprintf_s",
    "vfwscanf",
    "vfwscanf_s",
    "vprintf",
    "vprintf_s",
    "vscanf",
    "vscanf_s",
    "vsnprintf",
    "vsnprintf_s",
    "vsprintf",
    "vsprintf_s",
    "vsscanf",
    "vsscanf_s",
    "vswprintf",
    "vswprintf_s",
    "vswscanf",
    "vswscanf_s",
    "vwprintf",
    "vwprintf_s",
    "vwscanf",
    "vwscanf_s",
    "wprintf",
    "wprintf_s",
    "wscanf",
    "wscanf_s",
    // time
    "gmtime",
];

/// Name of the pointer array exported by the helper library.
pub const FALLBACK_ARRAY_SYMBOL: &str = "funcs";
pub const FALLBACK_ARRAY_CSYMBOL: &CStr = c"funcs";

/// One catalogue entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FallbackSlot {
    pub name: &'static str,
    pub ordinal: usize,
}

/// Ordered name/ordinal catalogue with an O(1) reverse index.
#[derive(Debug)]
pub struct FallbackTable {
    names: &'static [&'static str],
    index: HashMap<&'static str, usize>,
}

impl FallbackTable {
    /// Build a table whose ordinals are the positions in `names`.
    ///
    /// Names must be unique; a duplicate would make two ordinals share one
    /// reverse-index entry.
    #[must_use]
    pub fn from_names(names: &'static [&'static str]) -> Self {
        let mut index = HashMap::with_capacity(names.len());
        for (ordinal, name) in names.iter().enumerate() {
            let previous = index.insert(*name, ordinal);
            debug_assert!(previous.is_none(), "duplicate fallback symbol {name}");
        }
        Self { names, index }
    }

    /// The process-wide table for `ucrtbase.dll`.
    #[must_use]
    pub fn windows_ucrt() -> &'static Self {
        static TABLE: OnceLock<FallbackTable> = OnceLock::new();
        TABLE.get_or_init(|| Self::from_names(&UCRT_FALLBACK_SYMBOLS))
    }

    /// Ordinal of `name`, if it is part of the catalogue.
    #[must_use]
    pub fn ordinal_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    #[must_use]
    pub fn slot(&self, ordinal: usize) -> Option<FallbackSlot> {
        self.names
            .get(ordinal)
            .map(|&name| FallbackSlot { name, ordinal })
    }

    /// All slots in ordinal order.
    pub fn slots(&self) -> impl ExactSizeIterator<Item = FallbackSlot> + '_ {
        self.names
            .iter()
            .enumerate()
            .map(|(ordinal, &name)| FallbackSlot { name, ordinal })
    }

    #[must_use]
    pub fn names(&self) -> &'static [&'static str] {
        self.names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinals_are_contiguous_from_zero() {
        let table = FallbackTable::windows_ucrt();
        for (expected, slot) in table.slots().enumerate() {
            assert_eq!(slot.ordinal, expected);
            assert_eq!(table.ordinal_of(slot.name), Some(expected));
        }
        assert_eq!(table.len(), UCRT_FALLBACK_SYMBOLS.len());
    }

    #[test]
    fn names_are_unique() {
        let table = FallbackTable::windows_ucrt();
        assert_eq!(table.index.len(), table.len());
    }

    #[test]
    fn known_ordinals_are_pinned() {
        let table = FallbackTable::windows_ucrt();
        assert_eq!(table.ordinal_of("fprintf"), Some(0));
        assert_eq!(table.ordinal_of("printf"), Some(8));
        assert_eq!(table.ordinal_of("vsnprintf_s"), Some(34));
        assert_eq!(table.ordinal_of("wscanf_s"), Some(50));
        assert_eq!(table.ordinal_of("gmtime"), Some(51));
    }

    #[test]
    fn unknown_names_are_absent() {
        let table = FallbackTable::windows_ucrt();
        assert_eq!(table.ordinal_of("strlen"), None);
        assert_eq!(table.ordinal_of("PRINTF"), None);
        assert_eq!(table.ordinal_of("printf "), None);
        assert_eq!(table.ordinal_of(""), None);
        assert!(!table.contains("some_unknown_symbol_xyz"));
    }

    #[test]
    fn every_family_member_is_present() {
        let table = FallbackTable::windows_ucrt();
        for base in ["printf", "scanf", "wprintf", "wscanf"] {
            for prefix in ["", "f", "s", "v", "vf", "vs"] {
                let name = format!("{prefix}{base}");
                assert!(table.contains(&name), "missing {name}");
                assert!(table.contains(&format!("{name}_s")), "missing {name}_s");
            }
        }
        assert!(table.contains("snprintf"));
        assert!(table.contains("vsnprintf"));
        assert!(table.contains("vsnprintf_s"));
    }

    #[test]
    fn slot_lookup_is_bounded() {
        let table = FallbackTable::windows_ucrt();
        assert_eq!(
            table.slot(51),
            Some(FallbackSlot {
                name: "gmtime",
                ordinal: 51
            })
        );
        assert_eq!(table.slot(52), None);
    }

    #[test]
    fn array_symbol_spellings_agree() {
        assert_eq!(FALLBACK_ARRAY_CSYMBOL.to_str(), Ok(FALLBACK_ARRAY_SYMBOL));
    }

    #[test]
    fn custom_tables_index_by_position() {
        static NAMES: [&str; 2] = ["alpha", "beta"];
        let table = FallbackTable::from_names(&NAMES);
        assert_eq!(table.ordinal_of("beta"), Some(1));
        assert!(!table.is_empty());
        assert_eq!(table.names(), &NAMES);
    }
}
