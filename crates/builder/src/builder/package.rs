//! Archive packaging of headers and static libraries.
//!
//! Archive layout:
//! - `dist/include/...` from the first architecture's object dir
//! - macOS: universal `libjs_static.a` and `libjsrust.a` at the root
//! - others: `obj-<platform>-<arch>-<build type>/<lib>` per architecture

use super::error::{BuildError, IoContext, Result};
use super::exec::{Invocation, Runner};
use super::layout::Layout;
use super::platform::{Arch, BuildType, Platform};
use std::fs::File;
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const LIPO: &str = "/usr/bin/lipo";

/// A file to add to the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub source: PathBuf,
    /// Path inside the archive, `/`-separated
    pub name: String,
}

/// lipo commands merging per-architecture libraries into universal ones.
///
/// Empty for every platform but macOS.
pub fn universal_merges(
    layout: &Layout,
    platform: Platform,
    archs: &[Arch],
    build_type: BuildType,
) -> Vec<Invocation> {
    if platform != Platform::Macos {
        return Vec::new();
    }

    let core = Invocation::new(LIPO, &layout.base_dir)
        .args(["-create", "-output"])
        .arg(layout.universal_lib(platform.core_lib()))
        .args(archs.iter().map(|&arch| layout.core_lib(platform, arch)));

    let rust = Invocation::new(LIPO, &layout.base_dir)
        .args(["-create", "-output"])
        .arg(layout.universal_lib(platform.rust_lib()))
        .args(
            archs
                .iter()
                .map(|&arch| layout.rust_lib(platform, arch, build_type)),
        );

    vec![core, rust]
}

/// Collect archive entries from the build output.
///
/// Fails if the header tree or any library is missing.
pub fn plan(
    layout: &Layout,
    platform: Platform,
    archs: &[Arch],
    build_type: BuildType,
) -> Result<Vec<Entry>> {
    let first = *archs
        .first()
        .ok_or_else(|| BuildError::InvalidSelection("no architectures to package".to_string()))?;

    let mut entries = include_entries(&layout.objdir(platform, first), &layout.include_dir(platform, first))?;

    match platform {
        Platform::Macos => {
            for lib in [platform.core_lib(), platform.rust_lib()] {
                entries.push(Entry {
                    source: layout.universal_lib(lib),
                    name: lib.to_string(),
                });
            }
        }
        Platform::Win | Platform::Linux | Platform::Android => {
            for &arch in archs {
                let folder = format!("{}-{build_type}", Layout::objdir_name(platform, arch));
                for lib in layout.libraries(platform, arch, build_type) {
                    let file = lib
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    entries.push(Entry {
                        name: format!("{folder}/{file}"),
                        source: lib,
                    });
                }
            }
        }
    }

    for entry in &entries {
        if !entry.source.is_file() {
            return Err(BuildError::MissingArtifact(entry.source.clone()));
        }
    }

    Ok(entries)
}

/// Every file under `include_dir`, named relative to `objdir`.
fn include_entries(objdir: &Path, include_dir: &Path) -> Result<Vec<Entry>> {
    if !include_dir.is_dir() {
        return Err(BuildError::MissingArtifact(include_dir.to_path_buf()));
    }

    let mut entries = Vec::new();
    for item in WalkDir::new(include_dir).sort_by_file_name() {
        let item = item.map_err(|source| BuildError::Walk {
            path: include_dir.to_path_buf(),
            source,
        })?;
        // headers are usually symlinks into the source tree
        if !item.path().is_file() {
            continue;
        }
        let relative = item.path().strip_prefix(objdir).unwrap_or(item.path());
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        entries.push(Entry {
            source: item.path().to_path_buf(),
            name,
        });
    }
    Ok(entries)
}

/// Write `entries` to a zip at `path`.
///
/// The archive is assembled in a temporary file next to `path` and renamed
/// into place once complete. The result is world-readable on unix.
pub fn write_archive(path: &Path, entries: &[Entry]) -> Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut temp = tempfile::NamedTempFile::new_in(dir).at(dir)?;
    // temp files are created 0600
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        temp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o644))
            .at(temp.path())?;
    }

    write_zip(temp.as_file_mut(), entries)?;

    temp.persist(path).map_err(|e| e.error).at(path)?;
    Ok(())
}

fn write_zip<W: Write + Seek>(writer: W, entries: &[Entry]) -> Result<()> {
    let mut zip = ZipWriter::new(writer);

    for entry in entries {
        let mut source = File::open(&entry.source).at(&entry.source)?;
        let len = source.metadata().at(&entry.source)?.len();
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .large_file(len >= u64::from(u32::MAX));

        debug!("  adding {}", entry.name);
        zip.start_file(entry.name.as_str(), options)?;
        std::io::copy(&mut source, &mut zip).at(&entry.source)?;
    }

    zip.finish()?;
    Ok(())
}

/// Merge (macOS), collect and zip the build output.
///
/// Returns the archive entries. In dry-run mode only the merge commands are
/// logged and nothing is written.
pub fn package(
    runner: &mut dyn Runner,
    layout: &Layout,
    platform: Platform,
    archs: &[Arch],
    build_type: BuildType,
    archive: &Path,
) -> Result<Vec<Entry>> {
    println!("=== Packaging {} ===", archive.display());

    for merge in universal_merges(layout, platform, archs, build_type) {
        runner.run(&merge)?;
    }

    if runner.is_dry_run() {
        info!("[dry-run] would write {}", archive.display());
        return Ok(Vec::new());
    }

    let entries = plan(layout, platform, archs, build_type)?;
    write_archive(archive, &entries)?;

    info!("wrote {} ({} entries)", archive.display(), entries.len());
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"data").unwrap();
    }

    #[test]
    fn test_lipo_merges_for_macos_only() {
        let layout = Layout::new("/work", "/gecko");
        let archs = Platform::Macos.architectures();
        let merges = universal_merges(&layout, Platform::Macos, archs, BuildType::Release);
        assert_eq!(merges.len(), 2);
        assert_eq!(
            merges[0].args,
            vec![
                "-create",
                "-output",
                "/work/libjs_static.a",
                "/work/obj-macos-x86_64/js/src/build/libjs_static.a",
                "/work/obj-macos-aarch64/js/src/build/libjs_static.a",
            ]
        );
        assert_eq!(
            merges[1].args[3],
            "/work/obj-macos-x86_64/x86_64-apple-darwin/release/libjsrust.a"
        );

        let linux = Platform::Linux.architectures();
        assert!(universal_merges(&layout, Platform::Linux, linux, BuildType::Release).is_empty());
    }

    #[test]
    fn test_plan_android_names() {
        let dir = tempfile::tempdir().unwrap();
        let layout = Layout::new(dir.path(), dir.path());
        let platform = Platform::Android;
        let archs = [Arch::Arm];

        touch(&layout.include_dir(platform, Arch::Arm).join("jsapi.h"));
        for lib in layout.libraries(platform, Arch::Arm, BuildType::Debug) {
            touch(&lib);
        }

        let names: Vec<String> = plan(&layout, platform, &archs, BuildType::Debug)
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(
            names,
            vec![
                "dist/include/jsapi.h",
                "obj-android-arm-debug/libjs_static.a",
                "obj-android-arm-debug/libjsrust.a",
            ]
        );
    }

    #[test]
    fn test_plan_missing_library() {
        let dir = tempfile::tempdir().unwrap();
        let layout = Layout::new(dir.path(), dir.path());
        touch(&layout.include_dir(Platform::Linux, Arch::X86_64).join("jsapi.h"));

        let err = plan(&layout, Platform::Linux, &[Arch::X86_64], BuildType::Release).unwrap_err();
        assert!(matches!(err, BuildError::MissingArtifact(p) if p.ends_with("libjs_static.a")));
    }

    #[test]
    fn test_plan_missing_headers() {
        let dir = tempfile::tempdir().unwrap();
        let layout = Layout::new(dir.path(), dir.path());
        let err = plan(&layout, Platform::Win, &[Arch::X86_64], BuildType::Release).unwrap_err();
        assert!(matches!(err, BuildError::MissingArtifact(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_plan_follows_symlinked_headers() {
        let dir = tempfile::tempdir().unwrap();
        let layout = Layout::new(dir.path().join("work"), dir.path().join("gecko"));
        let platform = Platform::Linux;

        let real = layout.source_dir.join("js/public/jsapi.h");
        touch(&real);
        let include = layout.include_dir(platform, Arch::X86_64);
        std::fs::create_dir_all(include.join("js")).unwrap();
        std::os::unix::fs::symlink(&real, include.join("jsapi.h")).unwrap();
        std::os::unix::fs::symlink(&real, include.join("js/Value.h")).unwrap();
        for lib in layout.libraries(platform, Arch::X86_64, BuildType::Release) {
            touch(&lib);
        }

        let entries = plan(&layout, platform, &[Arch::X86_64], BuildType::Release).unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "dist/include/js/Value.h",
                "dist/include/jsapi.h",
                "obj-linux-x86_64-release/libjs_static.a",
                "obj-linux-x86_64-release/libjsrust.a",
            ]
        );

        let archive = dir.path().join("out.zip");
        write_archive(&archive, &entries).unwrap();
        let mut zip = zip::ZipArchive::new(File::open(&archive).unwrap()).unwrap();
        let mut header = String::new();
        std::io::Read::read_to_string(&mut zip.by_name("dist/include/jsapi.h").unwrap(), &mut header)
            .unwrap();
        assert_eq!(header, "data");
    }

    #[cfg(unix)]
    #[test]
    fn test_archive_is_world_readable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("libjs_static.a");
        touch(&source);
        let archive = dir.path().join("out.zip");
        let entries = vec![Entry {
            source,
            name: "libjs_static.a".to_string(),
        }];

        write_archive(&archive, &entries).unwrap();

        let mode = std::fs::metadata(&archive).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[test]
    fn test_write_archive_leaves_no_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("out.zip");
        let entries = vec![Entry {
            source: dir.path().join("missing.a"),
            name: "missing.a".to_string(),
        }];

        assert!(write_archive(&archive, &entries).is_err());
        assert!(!archive.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
