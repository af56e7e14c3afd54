//! # syslookup
//!
//! Companion helper library loaded by `system-lookup`.
//!
//! POSIX: the library exists for its dependencies. It links libc, libm and
//! (on Linux) libdl, so a `dlsym` against its handle reaches every symbol of
//! the C runtime without naming any of those libraries.
//!
//! Windows (MSVC): exports exactly one symbol, `funcs`, an array holding one
//! function pointer per fallback ordinal followed by a null terminator. The
//! universal CRT only provides these functions inline; out-of-line copies
//! come from `legacy_stdio_definitions.lib`.

macro_rules! fallback_slots {
    ($($name:ident $(=> $link:literal)?),* $(,)?) => {
        /// Names stored in `funcs`, in slot order.
        pub const SLOT_NAMES: &[&str] = &[$(stringify!($name)),*];

        /// Number of function slots, excluding the terminator.
        pub const SLOT_COUNT: usize = SLOT_NAMES.len();

        #[cfg(all(windows, target_env = "msvc"))]
        mod ucrt {
            #[link(name = "legacy_stdio_definitions")]
            unsafe extern "C" {
                $(
                    $(#[link_name = $link])?
                    fn $name();
                )*
            }

            /// Fallback table read by `system-lookup`.
            #[allow(non_upper_case_globals)]
            #[unsafe(no_mangle)]
            pub static funcs: [Option<unsafe extern "C" fn()>; super::SLOT_COUNT + 1] = [
                $(Some($name as unsafe extern "C" fn()),)*
                None,
            ];
        }
    };
}

fallback_slots! {
    // stdio
    fprintf,
    fprintf_s,
    fscanf,
    fscanf_s,
    fwprintf,
    fwprintf_s,
    fwscanf,
    fwscanf_s,
    printf,
    printf_s,
    scanf,
    scanf_s,
    snprintf,
    sprintf,
    sprintf_s,
    sscanf,
    sscanf_s,
    swprintf,
    swprintf_s,
    swscanf,
    swscanf_s,
    vfprintf,
    vfprintf_s,
    vfscanf,
    vfscanf_s,
    vfwprintf,
    vfwprintf_s,
    vfwscanf,
    vfwscanf_s,
    vprintf,
    vprintf_s,
    vscanf,
    vscanf_s,
    vsnprintf,
    vsnprintf_s,
    vsprintf,
    vsprintf_s,
    vsscanf,
    vsscanf_s,
    vswprintf,
    vswprintf_s,
    vswscanf,
    vswscanf_s,
    vwprintf,
    vwprintf_s,
    vwscanf,
    vwscanf_s,
    wprintf,
    wprintf_s,
    wscanf,
    wscanf_s,
    // time; the inline `gmtime` forwards to `_gmtime64`
    gmtime => "_gmtime64",
}

#[cfg(unix)]
mod posix {
    #[link(name = "m")]
    unsafe extern "C" {
        fn cos(x: f64) -> f64;
    }

    #[cfg(target_os = "linux")]
    #[link(name = "dl")]
    unsafe extern "C" {
        fn dlerror() -> *mut std::ffi::c_char;
    }

    /// Keeps libm and libdl in the library's dependency list; linkers drop
    /// libraries nothing references.
    #[unsafe(no_mangle)]
    pub extern "C" fn syslookup_dependencies() -> usize {
        let libm = cos as *const () as usize;
        #[cfg(target_os = "linux")]
        let libdl = dlerror as *const () as usize;
        #[cfg(not(target_os = "linux"))]
        let libdl = 0;
        libm ^ libdl
    }
}

#[cfg(unix)]
pub use posix::syslookup_dependencies;

#[cfg(test)]
mod tests {
    use super::*;
    use syslookup_core::fallback::UCRT_FALLBACK_SYMBOLS;

    #[test]
    fn slots_match_the_lookup_table() {
        assert_eq!(SLOT_NAMES, UCRT_FALLBACK_SYMBOLS.as_slice());
        assert_eq!(SLOT_COUNT, UCRT_FALLBACK_SYMBOLS.len());
    }

    #[cfg(all(windows, target_env = "msvc"))]
    #[test]
    fn exported_table_is_filled_and_terminated() {
        let table = &ucrt::funcs;
        assert_eq!(table.len(), SLOT_COUNT + 1);
        assert!(table[..SLOT_COUNT].iter().all(Option::is_some));
        assert!(table[SLOT_COUNT].is_none());
    }

    #[cfg(unix)]
    #[test]
    fn dependencies_are_referenced() {
        assert_ne!(syslookup_dependencies(), 0);
    }
}
