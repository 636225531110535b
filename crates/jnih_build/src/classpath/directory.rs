use super::manifest::{self, MANIFEST_PATH, VERSIONS_DIR};
use super::{ClassSource, ResolveError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A plain directory of class files, optionally carrying a multi-release
/// manifest like an exploded jar.
#[derive(Debug)]
pub struct DirectoryRoot {
    path: PathBuf,
    /// Overlay directories highest release first, then `path` itself.
    probe_dirs: Vec<PathBuf>,
    releases: Vec<u16>,
}

impl DirectoryRoot {
    pub fn open(path: &Path) -> Result<Self, ResolveError> {
        let releases = if read_manifest(path)?
            .as_deref()
            .is_some_and(manifest::is_multi_release)
        {
            overlay_releases(path)?
        } else {
            Vec::new()
        };

        let versions = path.join(VERSIONS_DIR);
        let mut probe_dirs: Vec<PathBuf> = releases
            .iter()
            .map(|release| versions.join(release.to_string()))
            .collect();
        probe_dirs.push(path.to_path_buf());

        debug!(path = %path.display(), releases = ?releases, "opened directory root");

        Ok(Self {
            path: path.to_path_buf(),
            probe_dirs,
            releases,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn releases(&self) -> &[u16] {
        &self.releases
    }

    pub fn find(&self, relative: &str) -> Result<Option<ClassSource>, ResolveError> {
        for dir in &self.probe_dirs {
            let candidate = dir.join(relative);
            if !candidate.is_file() {
                continue;
            }
            let bytes = fs::read(&candidate).map_err(|source| ResolveError::Io {
                path: candidate.clone(),
                source,
            })?;
            return Ok(Some(ClassSource {
                bytes,
                origin: candidate,
            }));
        }
        Ok(None)
    }
}

fn read_manifest(root: &Path) -> Result<Option<String>, ResolveError> {
    let path = root.join(MANIFEST_PATH);
    match fs::read(&path) {
        Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ResolveError::Io { path, source }),
    }
}

fn overlay_releases(root: &Path) -> Result<Vec<u16>, ResolveError> {
    let versions = root.join(VERSIONS_DIR);
    let entries = match fs::read_dir(&versions) {
        Ok(entries) => entries,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(ResolveError::Io {
                path: versions,
                source,
            })
        }
    };

    let mut releases = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ResolveError::Io {
            path: versions.clone(),
            source,
        })?;
        if !entry.path().is_dir() {
            continue;
        }
        if let Some(release) = entry.file_name().to_str().and_then(manifest::parse_release) {
            releases.push(release);
        }
    }
    Ok(manifest::overlay_order(releases))
}
