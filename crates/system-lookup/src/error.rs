//! Error types.
//!
//! Only [`SymbolNameError`] ever reaches a `find` caller. [`LookupInitError`]
//! describes why initialization degraded; it is logged and kept in the
//! degraded state, never returned from a lookup.

use std::path::PathBuf;

use thiserror::Error;

/// A symbol name that cannot be looked up at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolNameError {
    #[error("symbol name is empty")]
    Empty,
    #[error("symbol name contains a NUL byte at offset {position}")]
    InteriorNul { position: usize },
}

/// Failure while building the system lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupInitError {
    #[error("SystemRoot is not set; cannot locate System32")]
    SystemRootUnset,
    #[error("installation library directory is unknown")]
    LibraryDirUnknown,
    #[error("failed to load {}: {reason}", path.display())]
    Load { path: PathBuf, reason: String },
    #[error("{} does not export `{symbol}`", library.display())]
    MissingExport {
        library: PathBuf,
        symbol: &'static str,
    },
    #[error("fallback slot {ordinal} (`{name}`) is null in the helper table")]
    FallbackSlotNull { ordinal: usize, name: &'static str },
    #[error("helper table is not terminated after {expected} slots")]
    FallbackUnterminated { expected: usize },
    #[error("lookup initialization panicked: {message}")]
    Panicked { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_item() {
        let err = LookupInitError::MissingExport {
            library: PathBuf::from("/opt/app/bin/syslookup.dll"),
            symbol: "funcs",
        };
        assert_eq!(
            err.to_string(),
            "/opt/app/bin/syslookup.dll does not export `funcs`"
        );

        let err = LookupInitError::FallbackSlotNull {
            ordinal: 8,
            name: "printf",
        };
        assert!(err.to_string().contains("`printf`"));

        assert_eq!(
            SymbolNameError::InteriorNul { position: 3 }.to_string(),
            "symbol name contains a NUL byte at offset 3"
        );
    }
}
