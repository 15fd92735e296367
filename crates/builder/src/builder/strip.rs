//! Debug symbol stripping for release builds.
//!
//! Only macOS and Linux archives are stripped here; Windows and Android skip
//! symbol generation in the mozconfig instead.

use super::exec::Invocation;
use super::layout::Layout;
use super::platform::{Arch, BuildType, Platform};
use super::BuildFlags;
use std::path::PathBuf;

const MACOS_ARGS: &[&str] = &["-u", "-r", "-S"];
const LINUX_ARGS: &[&str] = &["--strip-unneeded", "--strip-debug"];

/// Strip tool and its arguments for `platform`/`arch`, if that platform is stripped.
pub fn tool(platform: Platform, arch: Arch) -> Option<(PathBuf, &'static [&'static str])> {
    match platform {
        Platform::Macos => Some((PathBuf::from("/usr/bin/strip"), MACOS_ARGS)),
        Platform::Linux => {
            let program = match arch {
                Arch::X86_64 => PathBuf::from("/usr/bin/strip"),
                Arch::I686 | Arch::Aarch64 | Arch::Arm => {
                    PathBuf::from(format!("/usr/bin/{arch}-linux-gnu-strip"))
                }
            };
            Some((program, LINUX_ARGS))
        }
        Platform::Win | Platform::Android => None,
    }
}

/// Strip commands for one architecture's two libraries.
///
/// Empty for debug builds, when symbols were requested, or on platforms
/// without a strip step.
pub fn invocations(
    layout: &Layout,
    platform: Platform,
    arch: Arch,
    flags: BuildFlags,
) -> Vec<Invocation> {
    if flags.keeps_symbols() {
        return Vec::new();
    }
    let Some((program, args)) = tool(platform, arch) else {
        return Vec::new();
    };

    layout
        .libraries(platform, arch, BuildType::Release)
        .into_iter()
        .map(|lib| {
            Invocation::new(&program, &layout.base_dir)
                .args(args)
                .arg(lib)
        })
        .collect()
}
