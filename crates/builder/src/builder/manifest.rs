//! Build manifest written next to the archive.

use super::error::{IoContext, Result};
use super::package::Entry;
use super::platform::{Arch, BuildType, Platform};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Serialize, Deserialize)]
pub struct Manifest {
    pub version: String,
    pub platform: Platform,
    pub architectures: Vec<Arch>,
    pub build_type: BuildType,
    /// RFC 3339, UTC
    pub created: String,
    pub entries: Vec<String>,
}

impl Manifest {
    pub fn new(
        version: &str,
        platform: Platform,
        archs: &[Arch],
        build_type: BuildType,
        entries: &[Entry],
    ) -> Self {
        Self {
            version: version.to_string(),
            platform,
            architectures: archs.to_vec(),
            build_type,
            created: chrono::Utc::now().to_rfc3339(),
            entries: entries.iter().map(|e| e.name.clone()).collect(),
        }
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::from).at(path)?;
        std::fs::write(path, json + "\n").at(path)
    }
}
