//! Process-wide system lookup.
//!
//! [`SystemLookup::global`] builds the lookup on first use, exactly once,
//! under a `OnceLock`; concurrent first callers wait for the winner. Any
//! failure during the build (including a panic inside the loader) leaves the
//! facade degraded: every lookup reports absent for the rest of the process.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::OnceLock;

use serde::Serialize;
use syslookup_core::{Platform, platform};

use crate::config::LookupConfig;
use crate::error::{LookupInitError, SymbolNameError};
use crate::loader::{LibraryLoader, NativeLoader};
use crate::log::{self, LogEntry, LogLevel};
use crate::lookup::{self, ResolvedLookup, SymbolLookup};
use crate::primary::CRuntime;
use crate::symbol::{Resolution, Symbol, SymbolName};

/// Outcome of the one-time build.
#[derive(Debug)]
pub enum SystemLookupState {
    Ready(ResolvedLookup),
    Degraded { cause: LookupInitError },
}

impl SymbolLookup for SystemLookupState {
    fn resolve(&self, name: &SymbolName<'_>) -> Option<Resolution> {
        match self {
            Self::Ready(lookup) => lookup.resolve(name),
            Self::Degraded { .. } => None,
        }
    }
}

/// Snapshot of how the lookup was built, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupStatus {
    pub platform: &'static str,
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<CRuntime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_library: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub helper_library: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_slots: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded_cause: Option<String>,
}

/// Lookup of C runtime symbols.
#[derive(Debug)]
pub struct SystemLookup {
    platform: Platform,
    state: SystemLookupState,
}

impl SystemLookup {
    /// The process-wide instance, built from the process environment with the
    /// native loader on first call.
    pub fn global() -> &'static Self {
        static GLOBAL: OnceLock<SystemLookup> = OnceLock::new();
        GLOBAL.get_or_init(|| {
            Self::initialize(platform::current(), LookupConfig::process(), &NativeLoader)
        })
    }

    /// Build a lookup. Never fails: errors produce a degraded instance.
    ///
    /// The first call in the process also sets up the log sink from
    /// `config`'s log target and level.
    pub fn initialize(
        platform: Platform,
        config: &LookupConfig,
        loader: &dyn LibraryLoader,
    ) -> Self {
        log::init(config);
        log::emit(LogEntry::new(LogLevel::Info, "init.start").with_platform(platform.as_str()));

        let built = panic::catch_unwind(AssertUnwindSafe(|| lookup::build(platform, config, loader)))
            .unwrap_or_else(|payload| {
                Err(LookupInitError::Panicked {
                    message: panic_message(payload.as_ref()),
                })
            });

        let state = match built {
            Ok(lookup) => {
                log::emit(
                    LogEntry::new(LogLevel::Info, "init.ready")
                        .with_platform(platform.as_str())
                        .with_runtime(lookup.runtime().as_str())
                        .with_library(lookup.primary().path()),
                );
                SystemLookupState::Ready(lookup)
            }
            Err(cause) => {
                log::emit(
                    LogEntry::new(LogLevel::Warn, "init.degraded")
                        .with_platform(platform.as_str())
                        .with_error(&cause),
                );
                SystemLookupState::Degraded { cause }
            }
        };

        Self { platform, state }
    }

    /// A lookup that never finds anything.
    #[must_use]
    pub fn degraded(platform: Platform, cause: LookupInitError) -> Self {
        Self {
            platform,
            state: SystemLookupState::Degraded { cause },
        }
    }

    /// Address of `name` in the system C runtime.
    ///
    /// `Ok(None)` when the symbol does not exist (or the lookup is degraded);
    /// `Err` only for names that cannot be symbols at all.
    pub fn find(&self, name: &str) -> Result<Option<Symbol>, SymbolNameError> {
        let name = SymbolName::new(name)?;
        Ok(self.state.find(&name))
    }

    /// Like [`SystemLookup::find`], also reporting where the hit came from.
    pub fn resolve(&self, name: &str) -> Result<Option<Resolution>, SymbolNameError> {
        let name = SymbolName::new(name)?;
        Ok(self.state.resolve(&name))
    }

    #[must_use]
    pub fn platform(&self) -> Platform {
        self.platform
    }

    #[must_use]
    pub fn state(&self) -> &SystemLookupState {
        &self.state
    }

    #[must_use]
    pub fn is_degraded(&self) -> bool {
        matches!(self.state, SystemLookupState::Degraded { .. })
    }

    #[must_use]
    pub fn status(&self) -> LookupStatus {
        let mut status = LookupStatus {
            platform: self.platform.as_str(),
            ready: false,
            runtime: None,
            primary_library: None,
            helper_library: None,
            fallback_slots: None,
            degraded_cause: None,
        };
        match &self.state {
            SystemLookupState::Ready(lookup) => {
                status.ready = true;
                status.runtime = Some(lookup.runtime());
                status.primary_library = Some(lookup.primary().path().to_path_buf());
                if let Some(fallback) = lookup.fallback() {
                    status.helper_library = Some(fallback.helper_path().to_path_buf());
                    status.fallback_slots = Some(fallback.table().len());
                }
            }
            SystemLookupState::Degraded { cause } => {
                status.degraded_cause = Some(cause.to_string());
            }
        }
        status
    }
}

/// Look `name` up in the process-wide [`SystemLookup`].
pub fn find(name: &str) -> Result<Option<Symbol>, SymbolNameError> {
    SystemLookup::global().find(name)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
