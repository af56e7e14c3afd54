//! OS family probe.
//!
//! The probe reads the OS-name property once and classifies it by prefix:
//! anything starting with `"Windows"` resolves through explicit exports,
//! everything else is treated as POSIX-like with transitive `dlsym`
//! visibility.

use std::fmt;
use std::sync::OnceLock;

/// OS family as far as symbol visibility is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// POSIX-style dynamic linking: lookups see a library's dependencies.
    Posix,
    /// Windows-style linking: only a module's own exports are visible.
    Windows,
}

impl Platform {
    /// Stable lowercase identifier, used in logs and reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Posix => "posix",
            Self::Windows => "windows",
        }
    }

    #[must_use]
    pub const fn is_windows(self) -> bool {
        matches!(self, Self::Windows)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify an OS-name property value.
#[must_use]
pub fn classify(os_name: &str) -> Platform {
    if os_name.starts_with("Windows") {
        Platform::Windows
    } else {
        Platform::Posix
    }
}

/// Conventional OS name for the build target.
///
/// Mirrors the names runtimes traditionally report (`"Windows"`, `"Linux"`,
/// `"Mac OS X"`); other targets report their raw identifier.
#[must_use]
pub fn os_name() -> &'static str {
    match std::env::consts::OS {
        "windows" => "Windows",
        "linux" => "Linux",
        "macos" => "Mac OS X",
        "freebsd" => "FreeBSD",
        "netbsd" => "NetBSD",
        "openbsd" => "OpenBSD",
        "solaris" | "illumos" => "SunOS",
        other => other,
    }
}

static CURRENT: OnceLock<Platform> = OnceLock::new();

/// The platform of the running process, probed once and memoized.
#[must_use]
pub fn current() -> Platform {
    *CURRENT.get_or_init(|| classify(os_name()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_windows_variants() {
        assert_eq!(classify("Windows"), Platform::Windows);
        assert_eq!(classify("Windows 11"), Platform::Windows);
        assert_eq!(classify("Windows Server 2022"), Platform::Windows);
    }

    #[test]
    fn classify_is_prefix_and_case_sensitive() {
        assert_eq!(classify("Linux"), Platform::Posix);
        assert_eq!(classify("Mac OS X"), Platform::Posix);
        assert_eq!(classify("windows"), Platform::Posix);
        assert_eq!(classify("NotWindows"), Platform::Posix);
        assert_eq!(classify(""), Platform::Posix);
    }

    #[test]
    fn current_matches_build_target() {
        let expected = if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Posix
        };
        assert_eq!(current(), expected);
        assert_eq!(current(), current());
    }

    #[test]
    fn display_uses_stable_ids() {
        assert_eq!(Platform::Posix.to_string(), "posix");
        assert_eq!(Platform::Windows.to_string(), "windows");
        assert!(Platform::Windows.is_windows());
        assert!(!Platform::Posix.is_windows());
    }
}
