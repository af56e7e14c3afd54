//! Symbol sources and their composition.

use serde_json::json;
use syslookup_core::{FallbackTable, Platform};

use crate::config::LookupConfig;
use crate::error::LookupInitError;
use crate::fallback::FallbackLookup;
use crate::loader::LibraryLoader;
use crate::log::{self, LogEntry, LogLevel};
use crate::primary::{CRuntime, LibraryLookup, open_primary};
use crate::symbol::{Resolution, Symbol, SymbolName};

/// Anything that can turn a symbol name into an address.
pub trait SymbolLookup: Send + Sync {
    fn resolve(&self, name: &SymbolName<'_>) -> Option<Resolution>;

    fn find(&self, name: &SymbolName<'_>) -> Option<Symbol> {
        self.resolve(name).map(|resolution| resolution.symbol)
    }
}

/// `primary`, then `fallback` for names the primary does not export.
#[derive(Debug)]
pub struct CompositeLookup<P, F> {
    primary: P,
    fallback: F,
}

impl<P: SymbolLookup, F: SymbolLookup> CompositeLookup<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }

    pub fn primary(&self) -> &P {
        &self.primary
    }

    pub fn fallback(&self) -> &F {
        &self.fallback
    }
}

impl<P: SymbolLookup, F: SymbolLookup> SymbolLookup for CompositeLookup<P, F> {
    fn resolve(&self, name: &SymbolName<'_>) -> Option<Resolution> {
        self.primary
            .resolve(name)
            .or_else(|| self.fallback.resolve(name))
    }
}

/// The working lookup selected for this process.
#[derive(Debug)]
pub enum ResolvedLookup {
    /// The runtime's own exports cover everything.
    Direct {
        runtime: CRuntime,
        lookup: LibraryLookup,
    },
    /// Runtime exports first, helper table second.
    WithFallback {
        runtime: CRuntime,
        lookup: CompositeLookup<LibraryLookup, FallbackLookup>,
    },
}

impl ResolvedLookup {
    #[must_use]
    pub fn runtime(&self) -> CRuntime {
        match self {
            Self::Direct { runtime, .. } | Self::WithFallback { runtime, .. } => *runtime,
        }
    }

    #[must_use]
    pub fn primary(&self) -> &LibraryLookup {
        match self {
            Self::Direct { lookup, .. } => lookup,
            Self::WithFallback { lookup, .. } => lookup.primary(),
        }
    }

    #[must_use]
    pub fn fallback(&self) -> Option<&FallbackLookup> {
        match self {
            Self::Direct { .. } => None,
            Self::WithFallback { lookup, .. } => Some(lookup.fallback()),
        }
    }
}

impl SymbolLookup for ResolvedLookup {
    fn resolve(&self, name: &SymbolName<'_>) -> Option<Resolution> {
        match self {
            Self::Direct { lookup, .. } => lookup.resolve(name),
            Self::WithFallback { lookup, .. } => lookup.resolve(name),
        }
    }
}

/// Build the lookup for `platform`.
///
/// POSIX and legacy-CRT Windows resolve directly; UCRT Windows adds the
/// helper's fallback table behind the runtime.
pub fn build(
    platform: Platform,
    config: &LookupConfig,
    loader: &dyn LibraryLoader,
) -> Result<ResolvedLookup, LookupInitError> {
    let (runtime, primary) = open_primary(platform, config, loader)?;
    log::emit(
        LogEntry::new(LogLevel::Debug, "primary.loaded")
            .with_platform(platform.as_str())
            .with_runtime(runtime.as_str())
            .with_library(primary.path()),
    );

    if !runtime.needs_fallback() {
        return Ok(ResolvedLookup::Direct {
            runtime,
            lookup: primary,
        });
    }

    let helper_path = config.helper_path(platform)?;
    let table = FallbackTable::windows_ucrt();
    // SAFETY: the helper library is built from `syslookup-helper`, whose
    // `funcs` export carries one slot per table ordinal plus a terminator.
    let fallback = unsafe { FallbackLookup::open(loader, &helper_path, table)? };
    log::emit(
        LogEntry::new(LogLevel::Debug, "fallback.loaded")
            .with_platform(platform.as_str())
            .with_runtime(runtime.as_str())
            .with_library(fallback.helper_path())
            .with_details(json!({ "slots": table.len() })),
    );

    Ok(ResolvedLookup::WithFallback {
        runtime,
        lookup: CompositeLookup::new(primary, fallback),
    })
}
