//! Locates the helper library built alongside the test binaries.

use std::path::{Path, PathBuf};

use syslookup_core::Platform;
use syslookup_core::layout::{HELPER_LIBRARY, map_library_name};

/// Directory holding `libsyslookup.{so,dylib}` under its canonical name.
///
/// Cargo places integration tests in `target/<profile>/deps` and the cdylib
/// in `target/<profile>`. When only the hashed copy in `deps` exists it is
/// staged into a temporary directory under the canonical name.
pub fn built_helper_dir() -> PathBuf {
    let name = map_library_name(Platform::Posix, HELPER_LIBRARY);
    let exe = std::env::current_exe().expect("test binary path");
    let deps = exe.parent().expect("test binary directory");

    for dir in [deps.parent(), Some(deps)].into_iter().flatten() {
        if dir.join(&name).is_file() {
            return dir.to_path_buf();
        }
    }

    let hashed = hashed_artifact(deps, &name)
        .unwrap_or_else(|| panic!("{name} not found near {}", deps.display()));
    let staged = std::env::temp_dir().join(format!("syslookup-helper-{}", std::process::id()));
    std::fs::create_dir_all(&staged).expect("staging directory");
    std::fs::copy(&hashed, staged.join(&name)).expect("stage helper library");
    staged
}

fn hashed_artifact(deps: &Path, name: &str) -> Option<PathBuf> {
    let (stem, ext) = name.rsplit_once('.')?;
    let prefix = format!("{stem}-");
    let suffix = format!(".{ext}");
    std::fs::read_dir(deps)
        .ok()?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .find(|path| {
            path.file_name()
                .and_then(|f| f.to_str())
                .is_some_and(|f| f.starts_with(&prefix) && f.ends_with(&suffix))
        })
}
