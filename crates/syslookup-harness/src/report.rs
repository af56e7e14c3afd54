//! Machine-readable reports.

use std::path::Path;

use serde::Serialize;
use syslookup_core::FallbackTable;
use syslookup_core::fallback::FALLBACK_ARRAY_SYMBOL;
use system_lookup::{
    CRuntime, LibraryLookup, LookupInitError, LookupStatus, NativeLoader, Resolution,
    SymbolLookup, SymbolName, SymbolOrigin, SystemLookup,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("lookup: {0}")]
    Lookup(#[from] LookupInitError),
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    #[serde(flatten)]
    pub status: LookupStatus,
    /// SHA-256 of the helper library file, when one is in use and readable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub helper_sha256: Option<String>,
}

impl StatusReport {
    #[must_use]
    pub fn for_lookup(lookup: &SystemLookup) -> Self {
        let status = lookup.status();
        // On POSIX the helper is the primary library itself.
        let helper = match status.runtime {
            Some(CRuntime::SideLibrary) => status.primary_library.as_deref(),
            _ => status.helper_library.as_deref(),
        };
        let helper_sha256 = helper.and_then(|path| sha256_hex(path).ok());
        Self {
            status,
            helper_sha256,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TableEntry {
    pub ordinal: usize,
    pub name: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableReport {
    pub array_symbol: &'static str,
    pub slots: Vec<TableEntry>,
}

impl TableReport {
    #[must_use]
    pub fn for_table(table: &FallbackTable) -> Self {
        Self {
            array_symbol: FALLBACK_ARRAY_SYMBOL,
            slots: table
                .slots()
                .map(|slot| TableEntry {
                    ordinal: slot.ordinal,
                    name: slot.name,
                })
                .collect(),
        }
    }
}

/// Where a probe looked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeSource {
    /// The process-wide system lookup.
    System,
    /// The running process image.
    Process,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeEntry {
    pub name: String,
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProbeEntry {
    fn absent(name: &str) -> Self {
        Self {
            name: name.to_string(),
            found: false,
            address: None,
            origin: None,
            error: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    pub source: ProbeSource,
    pub results: Vec<ProbeEntry>,
}

impl ProbeReport {
    /// Probe `names` through `lookup`.
    #[must_use]
    pub fn system<S: AsRef<str>>(lookup: &SystemLookup, names: &[S]) -> Self {
        let results = names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                match lookup.resolve(name) {
                    Ok(resolution) => entry_for(name, resolution),
                    Err(err) => ProbeEntry {
                        error: Some(err.to_string()),
                        ..ProbeEntry::absent(name)
                    },
                }
            })
            .collect();
        Self {
            source: ProbeSource::System,
            results,
        }
    }

    /// Probe `names` against the running process image.
    pub fn process<S: AsRef<str>>(names: &[S]) -> Result<Self, HarnessError> {
        let image = LibraryLookup::from_library(NativeLoader::this_process()?, "<process>".into());
        let results = names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                match SymbolName::new(name) {
                    Ok(symbol) => entry_for(name, image.resolve(&symbol)),
                    Err(err) => ProbeEntry {
                        error: Some(err.to_string()),
                        ..ProbeEntry::absent(name)
                    },
                }
            })
            .collect();
        Ok(Self {
            source: ProbeSource::Process,
            results,
        })
    }

    #[must_use]
    pub fn found(&self) -> usize {
        self.results.iter().filter(|r| r.found).count()
    }
}

fn entry_for(name: &str, resolution: Option<Resolution>) -> ProbeEntry {
    match resolution {
        Some(resolution) => ProbeEntry {
            found: true,
            address: Some(resolution.symbol.to_string()),
            origin: Some(match resolution.origin {
                SymbolOrigin::Library => "library".to_string(),
                SymbolOrigin::Fallback { ordinal } => format!("fallback[{ordinal}]"),
            }),
            ..ProbeEntry::absent(name)
        },
        None => ProbeEntry::absent(name),
    }
}

/// Serialize any report as pretty JSON.
pub fn to_json<T: Serialize>(report: &T) -> Result<String, HarnessError> {
    Ok(serde_json::to_string_pretty(report)?)
}

fn hex_lower(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(&mut out, "{b:02x}");
    }
    out
}

/// SHA-256 of a file, lowercase hex.
pub fn sha256_hex(path: &Path) -> Result<String, HarnessError> {
    use sha2::Digest;
    let data = std::fs::read(path)?;
    Ok(hex_lower(&sha2::Sha256::digest(&data)))
}
