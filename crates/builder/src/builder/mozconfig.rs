//! MOZCONFIG generation.
//!
//! mach reads build options from the file named by the `MOZCONFIG`
//! environment variable. One file is generated per architecture and
//! rewritten before each build.

use super::platform::{Arch, Platform};
use super::toolchain::Toolchain;
use super::BuildFlags;
use std::path::Path;

/// Build configuration for one platform/architecture pair.
pub struct Mozconfig<'a> {
    pub platform: Platform,
    pub arch: Arch,
    pub flags: BuildFlags,
    pub toolchain: &'a Toolchain,
    pub objdir: &'a Path,
}

impl Mozconfig<'_> {
    /// Render the directive lines.
    pub fn render(&self) -> String {
        let mut lines: Vec<String> = vec![
            "# JS shell only".to_string(),
            option("--enable-application=js"),
        ];

        if self.flags.debug {
            lines.push(option("--enable-debug"));
            lines.push("# no optimization for accurate debugging".to_string());
            lines.push(option("--disable-optimize"));
        }

        match self.platform {
            Platform::Macos => {
                lines.push(option(&format!("--with-macos-sdk={}", self.toolchain.macos_sdk)));
                lines.push(option(&format!(
                    "--enable-macos-target={}",
                    self.toolchain.macos_target
                )));
            }
            Platform::Win | Platform::Android => {
                if !self.flags.debug && !self.flags.symbols {
                    lines.push(option("--disable-debug-symbols"));
                }
            }
            Platform::Linux => {}
        }

        lines.push(option("--disable-tests"));

        if self.platform == Platform::Android {
            lines.push(option(&format!(
                "--with-android-ndk={}",
                self.toolchain.android_ndk
            )));
        }
        lines.push(option(&format!(
            "--target={}",
            self.platform.configure_target(self.arch)
        )));

        // mozglue links statically only without jemalloc
        lines.push(option("--disable-jemalloc"));

        lines.push(format!(
            "mk_add_options MOZ_OBJDIR={}",
            slashed(self.objdir)
        ));

        let mut text = lines.join("\n");
        text.push('\n');
        text
    }
}

fn option(flag: &str) -> String {
    format!("ac_add_options {flag}")
}

/// mach expects forward slashes even on Windows.
pub(crate) fn slashed(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const ALL: [Platform; 4] = [
        Platform::Macos,
        Platform::Win,
        Platform::Linux,
        Platform::Android,
    ];

    fn render(platform: Platform, arch: Arch, flags: BuildFlags) -> String {
        let toolchain = Toolchain::default();
        let objdir = PathBuf::from("/work/obj");
        Mozconfig {
            platform,
            arch,
            flags,
            toolchain: &toolchain,
            objdir: &objdir,
        }
        .render()
    }

    fn release() -> BuildFlags {
        BuildFlags::default()
    }

    fn debug() -> BuildFlags {
        BuildFlags {
            debug: true,
            ..BuildFlags::default()
        }
    }

    #[test]
    fn test_always_js_shell_without_tests() {
        for platform in ALL {
            for flags in [release(), debug()] {
                let text = render(platform, Arch::X86_64, flags);
                assert!(text.contains("ac_add_options --enable-application=js\n"));
                assert!(text.contains("ac_add_options --disable-tests\n"));
                assert!(text.contains("ac_add_options --disable-jemalloc\n"));
            }
        }
    }

    #[test]
    fn test_debug_disables_optimize() {
        for platform in ALL {
            assert!(render(platform, Arch::X86_64, debug()).contains("--disable-optimize"));
            assert!(render(platform, Arch::X86_64, debug()).contains("--enable-debug"));
            assert!(!render(platform, Arch::X86_64, release()).contains("--disable-optimize"));
        }
    }

    #[test]
    fn test_macos_sdk_line_once() {
        let text = render(Platform::Macos, Arch::Aarch64, release());
        assert_eq!(text.matches("--with-macos-sdk=").count(), 1);
        assert!(text.contains("--enable-macos-target=10.13"));
        assert!(!render(Platform::Linux, Arch::Aarch64, release()).contains("macos"));
    }

    #[test]
    fn test_debug_symbols_disabled_on_release_win_and_android() {
        let symbols = BuildFlags {
            symbols: true,
            ..BuildFlags::default()
        };
        for platform in [Platform::Win, Platform::Android] {
            assert!(render(platform, Arch::X86_64, release()).contains("--disable-debug-symbols"));
            assert!(!render(platform, Arch::X86_64, debug()).contains("--disable-debug-symbols"));
            assert!(!render(platform, Arch::X86_64, symbols).contains("--disable-debug-symbols"));
        }
        assert!(!render(Platform::Linux, Arch::X86_64, release()).contains("--disable-debug-symbols"));
    }

    #[test]
    fn test_target_lines() {
        let android = render(Platform::Android, Arch::Arm, release());
        assert!(android.contains("--with-android-ndk=c:/mozilla-build/android-ndk-r27c\n"));
        assert!(android.contains("--target=arm-linux-android\n"));

        let win = render(Platform::Win, Arch::I686, release());
        assert!(win.contains("ac_add_options --target=i686\n"));
        assert!(!win.contains("android"));
    }

    #[test]
    fn test_objdir_line_last() {
        let text = render(Platform::Linux, Arch::X86_64, release());
        assert!(text.ends_with("mk_add_options MOZ_OBJDIR=/work/obj\n"));
    }
}
