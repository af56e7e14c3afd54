//! Fixtures shared by the system-lookup benchmarks.
//!
//! [`fixture_lookup`] builds a Windows/UCRT lookup over in-memory libraries,
//! so the composite path can be measured on any host.

use std::path::Path;

use system_lookup::testing::{FAKE_FUNCS_LEN, ScriptedLibrary, ScriptedLoader, fake_funcs};
use system_lookup::{LookupConfig, Platform, SystemLookup};

static FIXTURE_FUNCS: [usize; FAKE_FUNCS_LEN] = fake_funcs(None, 0);

/// Runtime exports served by the fixture's primary library.
pub const PRIMARY_EXPORTS: &[&str] = &["strlen", "malloc", "free", "memcpy", "fopen"];

/// A ready Windows/UCRT lookup backed by fixture libraries.
#[must_use]
pub fn fixture_lookup() -> SystemLookup {
    let config = LookupConfig::default()
        .with_system_root("C:/Windows")
        .with_install_root("/opt/app");

    let runtime = PRIMARY_EXPORTS
        .iter()
        .enumerate()
        .fold(ScriptedLibrary::default(), |lib, (i, name)| {
            lib.export(name, 0x1000 + i * 0x10)
        });

    let system32 = Path::new("C:/Windows").join("System32");
    let loader = ScriptedLoader::default()
        .with(system32.join("ucrtbase.dll"), runtime)
        .with(
            Path::new("/opt/app").join("bin").join("syslookup.dll"),
            ScriptedLibrary::helper(&FIXTURE_FUNCS),
        );

    SystemLookup::initialize(Platform::Windows, &config, &loader)
}
