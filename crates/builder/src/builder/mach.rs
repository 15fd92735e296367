//! Build driver (mach) invocation.

use super::exec::Invocation;
use super::layout::Layout;
use super::mozconfig::slashed;
use super::platform::Platform;
use super::toolchain::Toolchain;
use super::BuildFlags;

/// Verb passed to mach. Only `build` is used by the pipeline.
pub const BUILD: &str = "build";

/// Environment every mach run gets.
pub fn environment(layout: &Layout, platform: Platform, flags: BuildFlags) -> Vec<(String, String)> {
    let mut env = vec![
        (
            "MACH_BUILD_PYTHON_NATIVE_PACKAGE_SOURCE".to_string(),
            "system".to_string(),
        ),
        ("NO_RUST_PANIC_HOOK".to_string(), "1".to_string()),
        ("MOZCONFIG".to_string(), slashed(&layout.mozconfig())),
    ];

    match platform {
        Platform::Win => {
            // multithreaded dynamic debug runtime
            let cxxflags = if flags.debug || flags.debug_crt {
                "-D_DEBUG=1 -MDd"
            } else {
                ""
            };
            env.push(("CXXFLAGS".to_string(), cxxflags.to_string()));
        }
        Platform::Android => env.push(("CXXFLAGS".to_string(), "-frtti".to_string())),
        Platform::Macos | Platform::Linux => {}
    }

    env
}

/// Command line for `mach <verb>`, run from the base dir.
pub fn invocation(
    layout: &Layout,
    platform: Platform,
    toolchain: &Toolchain,
    flags: BuildFlags,
    verb: &str,
) -> Invocation {
    let mach = slashed(&layout.mach());
    let base = if platform.mach_via_python() {
        Invocation::new(&toolchain.python, &layout.base_dir).arg(mach)
    } else {
        Invocation::new(mach, &layout.base_dir)
    };

    environment(layout, platform, flags)
        .into_iter()
        .fold(base.arg(verb), |inv, (key, value)| inv.env(&key, value))
}
