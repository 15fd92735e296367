//! Gecko version lookup from `config/milestone.txt`.

use super::error::{BuildError, IoContext, Result};
use std::path::Path;

/// Pre-release marker carried by nightly milestones.
const PRERELEASE: &str = "a1";

/// Read the milestone file and derive the archive version.
pub fn read(milestone: &Path) -> Result<String> {
    let content = std::fs::read_to_string(milestone).at(milestone)?;
    parse(&content).ok_or_else(|| BuildError::NoVersion(milestone.to_path_buf()))
}

/// Derive the version from milestone file content.
///
/// Uses the first line starting with a digit (the rest are comments), drops
/// the pre-release marker and trailing `.0` components.
pub fn parse(content: &str) -> Option<String> {
    let line = content
        .lines()
        .find(|line| line.starts_with(|c: char| c.is_ascii_digit()))?;

    let mut version = line.trim_end().replace(PRERELEASE, "");
    while let Some(stripped) = version.strip_suffix(".0") {
        version = stripped.to_string();
    }
    Some(version)
}
