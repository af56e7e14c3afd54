//! Library naming and installation layout.
//!
//! The helper library is addressed by a logical name and mapped to a
//! platform file name (`libsyslookup.so`, `libsyslookup.dylib`,
//! `syslookup.dll`). It ships in the installation's library directory:
//! `<root>/bin` on Windows (next to the executables, where the loader looks
//! for DLLs), `<root>/lib` elsewhere.

use std::path::{Path, PathBuf};

use crate::platform::Platform;

/// Logical name of the companion helper library.
pub const HELPER_LIBRARY: &str = "syslookup";

/// Universal CRT, present on Windows 10+ and redistributable before that.
pub const UCRT_DLL: &str = "ucrtbase.dll";

/// Legacy system CRT, exports the stdio family directly.
pub const MSVCRT_DLL: &str = "msvcrt.dll";

/// Map a logical library name to its file name on `platform`.
#[must_use]
pub fn map_library_name(platform: Platform, name: &str) -> String {
    match platform {
        Platform::Windows => format!("{name}.dll"),
        Platform::Posix if cfg!(target_vendor = "apple") => format!("lib{name}.dylib"),
        Platform::Posix => format!("lib{name}.so"),
    }
}

/// Library subdirectory of an installation root.
#[must_use]
pub const fn library_subdir(platform: Platform) -> &'static str {
    match platform {
        Platform::Windows => "bin",
        Platform::Posix => "lib",
    }
}

/// Library directory of the installation rooted at `root`.
#[must_use]
pub fn library_dir(root: &Path, platform: Platform) -> PathBuf {
    root.join(library_subdir(platform))
}

/// Full path of the helper library inside `library_dir`.
#[must_use]
pub fn helper_library_path(library_dir: &Path, platform: Platform) -> PathBuf {
    library_dir.join(map_library_name(platform, HELPER_LIBRARY))
}

/// `<system_root>/System32`.
#[must_use]
pub fn system32_dir(system_root: &Path) -> PathBuf {
    system_root.join("System32")
}

/// Install root implied by an executable living in `<root>/bin/`.
#[must_use]
pub fn install_root_for_exe(exe: &Path) -> Option<PathBuf> {
    exe.parent()?.parent().map(Path::to_path_buf)
}
