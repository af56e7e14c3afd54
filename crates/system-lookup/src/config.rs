//! Environment configuration.
//!
//! Read once per process through [`LookupConfig::process`]:
//! - `SystemRoot`: Windows root directory; `System32` lives beneath it.
//! - `SYSLOOKUP_HOME`: installation root. The helper library is expected in
//!   `<root>/bin` on Windows and `<root>/lib` elsewhere. Defaults to the
//!   parent of the directory holding the running executable.
//! - `SYSLOOKUP_LIBRARY_DIR`: explicit helper directory, overrides the root.
//! - `SYSLOOKUP_LOG`: structured log target (`stderr`, `stdout`, a file path,
//!   or `off`, the default).
//! - `SYSLOOKUP_LOG_LEVEL`: minimum level written (default `info`).

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use syslookup_core::{Platform, layout};

use crate::error::LookupInitError;
use crate::log::LogLevel;

pub const ENV_SYSTEM_ROOT: &str = "SystemRoot";
pub const ENV_HOME: &str = "SYSLOOKUP_HOME";
pub const ENV_LIBRARY_DIR: &str = "SYSLOOKUP_LIBRARY_DIR";
pub const ENV_LOG: &str = "SYSLOOKUP_LOG";
pub const ENV_LOG_LEVEL: &str = "SYSLOOKUP_LOG_LEVEL";

/// Where structured log lines go.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LogTarget {
    #[default]
    Off,
    Stderr,
    Stdout,
    File(PathBuf),
}

impl LogTarget {
    /// Parse from string; anything that is not a keyword is a file path.
    #[must_use]
    pub fn from_str_loose(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "off" | "none" | "0" | "false" => Self::Off,
            "stderr" | "1" | "true" => Self::Stderr,
            "stdout" => Self::Stdout,
            _ => Self::File(PathBuf::from(s.trim())),
        }
    }
}

/// Resolved configuration for building the system lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupConfig {
    pub system_root: Option<PathBuf>,
    pub install_root: Option<PathBuf>,
    pub library_dir: Option<PathBuf>,
    pub log_target: LogTarget,
    pub log_level: LogLevel,
}

impl LookupConfig {
    /// Configuration of the running process, read on first call.
    #[must_use]
    pub fn process() -> &'static Self {
        static CONFIG: OnceLock<LookupConfig> = OnceLock::new();
        CONFIG.get_or_init(Self::from_env)
    }

    /// Read the process environment, filling in the default install root.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::from_vars(|key| std::env::var_os(key));
        if config.install_root.is_none() {
            config.install_root = std::env::current_exe()
                .ok()
                .and_then(|exe| layout::install_root_for_exe(&exe));
        }
        config
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_vars<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let path = |key: &str| get(key).filter(|v| !v.is_empty()).map(PathBuf::from);
        let text = |key: &str| get(key).map(|v| v.to_string_lossy().into_owned());

        Self {
            system_root: path(ENV_SYSTEM_ROOT),
            install_root: path(ENV_HOME),
            library_dir: path(ENV_LIBRARY_DIR),
            log_target: text(ENV_LOG)
                .map(|v| LogTarget::from_str_loose(&v))
                .unwrap_or_default(),
            log_level: text(ENV_LOG_LEVEL)
                .map(|v| LogLevel::from_str_loose(&v))
                .unwrap_or_default(),
        }
    }

    #[must_use]
    pub fn with_system_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.system_root = Some(root.into());
        self
    }

    #[must_use]
    pub fn with_install_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.install_root = Some(root.into());
        self
    }

    #[must_use]
    pub fn with_library_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.library_dir = Some(dir.into());
        self
    }

    pub fn system_root(&self) -> Result<&Path, LookupInitError> {
        self.system_root
            .as_deref()
            .ok_or(LookupInitError::SystemRootUnset)
    }

    /// Directory holding the helper library on `platform`.
    pub fn helper_dir(&self, platform: Platform) -> Result<PathBuf, LookupInitError> {
        if let Some(dir) = &self.library_dir {
            return Ok(dir.clone());
        }
        self.install_root
            .as_deref()
            .map(|root| layout::library_dir(root, platform))
            .ok_or(LookupInitError::LibraryDirUnknown)
    }

    /// Full path of the helper library on `platform`.
    pub fn helper_path(&self, platform: Platform) -> Result<PathBuf, LookupInitError> {
        self.helper_dir(platform)
            .map(|dir| layout::helper_library_path(&dir, platform))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<OsString> {
        let map: HashMap<String, OsString> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), OsString::from(v)))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_is_default() {
        let config = LookupConfig::from_vars(vars(&[]));
        assert_eq!(config, LookupConfig::default());
        assert_eq!(config.log_target, LogTarget::Off);
        assert_eq!(config.log_level, LogLevel::Info);
    }

    #[test]
    fn reads_every_variable() {
        let config = LookupConfig::from_vars(vars(&[
            ("SystemRoot", "C:/Windows"),
            ("SYSLOOKUP_HOME", "/opt/app"),
            ("SYSLOOKUP_LIBRARY_DIR", "/opt/app/native"),
            ("SYSLOOKUP_LOG", "stderr"),
            ("SYSLOOKUP_LOG_LEVEL", "DEBUG"),
        ]));
        assert_eq!(config.system_root.as_deref(), Some(Path::new("C:/Windows")));
        assert_eq!(config.install_root.as_deref(), Some(Path::new("/opt/app")));
        assert_eq!(
            config.library_dir.as_deref(),
            Some(Path::new("/opt/app/native"))
        );
        assert_eq!(config.log_target, LogTarget::Stderr);
        assert_eq!(config.log_level, LogLevel::Debug);
    }

    #[test]
    fn empty_values_are_unset() {
        let config = LookupConfig::from_vars(vars(&[("SystemRoot", ""), ("SYSLOOKUP_HOME", "")]));
        assert_eq!(config.system_root(), Err(LookupInitError::SystemRootUnset));
        assert_eq!(
            config.helper_dir(Platform::Posix),
            Err(LookupInitError::LibraryDirUnknown)
        );
    }

    #[test]
    fn library_dir_overrides_install_root() {
        let config = LookupConfig::default()
            .with_install_root("/opt/app")
            .with_library_dir("/srv/native");
        assert_eq!(
            config.helper_dir(Platform::Windows).unwrap(),
            PathBuf::from("/srv/native")
        );
        assert_eq!(
            config.helper_path(Platform::Windows).unwrap(),
            PathBuf::from("/srv/native/syslookup.dll")
        );
    }

    #[test]
    fn install_root_uses_platform_subdir() {
        let config = LookupConfig::default().with_install_root("/opt/app");
        assert_eq!(
            config.helper_dir(Platform::Windows).unwrap(),
            PathBuf::from("/opt/app/bin")
        );
        assert_eq!(
            config.helper_dir(Platform::Posix).unwrap(),
            PathBuf::from("/opt/app/lib")
        );
    }

    #[test]
    fn log_targets_parse_loosely() {
        assert_eq!(LogTarget::from_str_loose("OFF"), LogTarget::Off);
        assert_eq!(LogTarget::from_str_loose("1"), LogTarget::Stderr);
        assert_eq!(LogTarget::from_str_loose("stdout"), LogTarget::Stdout);
        assert_eq!(
            LogTarget::from_str_loose("/tmp/lookup.jsonl"),
            LogTarget::File(PathBuf::from("/tmp/lookup.jsonl"))
        );
    }

    #[test]
    fn process_config_is_sticky() {
        assert!(std::ptr::eq(LookupConfig::process(), LookupConfig::process()));
    }
}
