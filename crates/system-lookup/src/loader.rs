//! Native library loading.
//!
//! [`LibraryLoader`] is the seam between lookup strategy and the OS loader:
//! production code uses [`NativeLoader`] (`dlopen`/`dlsym` on POSIX,
//! `LoadLibraryExW`/`GetProcAddress` on Windows), tests substitute their own.
//!
//! Loaded libraries are never unloaded. Neither native handle type closes on
//! drop; symbol addresses handed out stay valid for the life of the process.

use std::ffi::CStr;
use std::path::Path;

use crate::error::LookupInitError;
use crate::symbol::Symbol;

/// A library that can answer symbol queries.
pub trait LoadedLibrary: Send + Sync {
    /// Address of `name`, or `None` if the library does not provide it.
    fn lookup(&self, name: &CStr) -> Option<Symbol>;
}

/// Loads libraries by path.
pub trait LibraryLoader {
    fn load(&self, path: &Path) -> Result<Box<dyn LoadedLibrary>, LookupInitError>;

    /// Whether a library file exists at `path`.
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// The OS dynamic loader.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeLoader;

impl NativeLoader {
    /// Handle on the running process image and everything it has loaded.
    pub fn this_process() -> Result<Box<dyn LoadedLibrary>, LookupInitError> {
        Ok(Box::new(native::NativeLibrary::this_process()?))
    }
}

impl LibraryLoader for NativeLoader {
    fn load(&self, path: &Path) -> Result<Box<dyn LoadedLibrary>, LookupInitError> {
        Ok(Box::new(native::NativeLibrary::open(path)?))
    }
}

#[cfg(unix)]
mod native {
    use std::ffi::{CStr, CString, c_void};
    use std::os::unix::ffi::OsStrExt;
    use std::path::Path;
    use std::ptr::NonNull;

    use super::LoadedLibrary;
    use crate::error::LookupInitError;
    use crate::symbol::Symbol;

    pub(super) struct NativeLibrary {
        handle: NonNull<c_void>,
    }

    // SAFETY: a dlopen handle is a process-global token; dlsym is thread-safe.
    unsafe impl Send for NativeLibrary {}
    // SAFETY: see above; the handle is never mutated or closed.
    unsafe impl Sync for NativeLibrary {}

    impl NativeLibrary {
        pub(super) fn open(path: &Path) -> Result<Self, LookupInitError> {
            let c_path =
                CString::new(path.as_os_str().as_bytes()).map_err(|_| LookupInitError::Load {
                    path: path.to_path_buf(),
                    reason: "path contains a NUL byte".to_string(),
                })?;
            // SAFETY: c_path is a valid NUL-terminated string.
            let handle = unsafe { libc::dlopen(c_path.as_ptr(), libc::RTLD_LAZY | libc::RTLD_LOCAL) };
            NonNull::new(handle)
                .map(|handle| Self { handle })
                .ok_or_else(|| LookupInitError::Load {
                    path: path.to_path_buf(),
                    reason: last_dlerror(),
                })
        }

        pub(super) fn this_process() -> Result<Self, LookupInitError> {
            // SAFETY: a null filename asks for the main program handle.
            let handle = unsafe { libc::dlopen(std::ptr::null(), libc::RTLD_LAZY) };
            NonNull::new(handle)
                .map(|handle| Self { handle })
                .ok_or_else(|| LookupInitError::Load {
                    path: "<process>".into(),
                    reason: last_dlerror(),
                })
        }
    }

    impl LoadedLibrary for NativeLibrary {
        fn lookup(&self, name: &CStr) -> Option<Symbol> {
            // SAFETY: handle came from a successful dlopen and is never closed;
            // name is NUL-terminated.
            let addr = unsafe { libc::dlsym(self.handle.as_ptr(), name.as_ptr()) };
            Symbol::from_ptr(addr)
        }
    }

    fn last_dlerror() -> String {
        // SAFETY: dlerror returns null or a thread-local NUL-terminated string.
        let msg = unsafe { libc::dlerror() };
        if msg.is_null() {
            return "unknown dlopen failure".to_string();
        }
        // SAFETY: non-null dlerror result is a valid C string until the next dl* call.
        unsafe { CStr::from_ptr(msg) }.to_string_lossy().into_owned()
    }
}

#[cfg(windows)]
mod native {
    use std::ffi::{CStr, c_void};
    use std::os::windows::ffi::OsStrExt;
    use std::path::Path;

    use windows::Win32::Foundation::{HANDLE, HMODULE};
    use windows::Win32::System::LibraryLoader::{
        GetModuleHandleW, GetProcAddress, LOAD_WITH_ALTERED_SEARCH_PATH, LoadLibraryExW,
    };
    use windows::core::{PCSTR, PCWSTR};

    use super::LoadedLibrary;
    use crate::error::LookupInitError;
    use crate::symbol::Symbol;

    pub(super) struct NativeLibrary {
        module: *mut c_void,
    }

    // SAFETY: an HMODULE is a process-global token; GetProcAddress is
    // thread-safe and the module is never freed.
    unsafe impl Send for NativeLibrary {}
    // SAFETY: see above.
    unsafe impl Sync for NativeLibrary {}

    impl NativeLibrary {
        pub(super) fn open(path: &Path) -> Result<Self, LookupInitError> {
            let wide: Vec<u16> = path
                .as_os_str()
                .encode_wide()
                .chain(std::iter::once(0))
                .collect();
            // SAFETY: wide is a valid NUL-terminated UTF-16 string. The altered
            // search path resolves the library's own dependencies next to it.
            let module = unsafe {
                LoadLibraryExW(
                    PCWSTR(wide.as_ptr()),
                    HANDLE::default(),
                    LOAD_WITH_ALTERED_SEARCH_PATH,
                )
            }
            .map_err(|e| LookupInitError::Load {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
            Ok(Self { module: module.0 })
        }

        pub(super) fn this_process() -> Result<Self, LookupInitError> {
            // SAFETY: a null module name returns the executable's own module.
            let module = unsafe { GetModuleHandleW(PCWSTR::null()) }.map_err(|e| {
                LookupInitError::Load {
                    path: "<process>".into(),
                    reason: e.to_string(),
                }
            })?;
            Ok(Self { module: module.0 })
        }
    }

    impl LoadedLibrary for NativeLibrary {
        fn lookup(&self, name: &CStr) -> Option<Symbol> {
            // SAFETY: module came from a successful load and is never freed;
            // name is NUL-terminated.
            let proc = unsafe { GetProcAddress(HMODULE(self.module), PCSTR(name.as_ptr().cast())) }?;
            Symbol::from_addr(proc as usize)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_library_reports_path() {
        let path = Path::new("/nonexistent/dir/libsyslookup-missing.so");
        let err = NativeLoader.load(path).err().expect("load must fail");
        match err {
            LookupInitError::Load { path: reported, reason } => {
                assert_eq!(reported, path);
                assert!(!reason.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn exists_checks_for_files() {
        assert!(!NativeLoader.exists(Path::new("/nonexistent/dir/ucrtbase.dll")));
        assert!(!NativeLoader.exists(&std::env::temp_dir()));
    }

    #[cfg(unix)]
    #[test]
    fn process_image_sees_libc() {
        let process = NativeLoader::this_process().unwrap();
        assert!(process.lookup(c"strlen").is_some());
        assert!(process.lookup(c"malloc").is_some());
        assert!(process.lookup(c"some_unknown_symbol_xyz").is_none());
    }

    #[cfg(windows)]
    #[test]
    fn process_image_is_loadable() {
        let process = NativeLoader::this_process().unwrap();
        assert!(process.lookup(c"some_unknown_symbol_xyz").is_none());
    }
}
