use super::manifest::{self, MANIFEST_PATH, VERSIONS_DIR};
use super::{ClassSource, ResolveError};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;
use zip::result::ZipError;
use zip::ZipArchive;

/// Subtree holding class files inside a `.jmod`.
const JMOD_CLASSES_DIR: &str = "classes/";

type Archive = ZipArchive<BufReader<File>>;

/// A jar, zip or jmod opened as a virtual file tree.
pub struct ArchiveRoot {
    path: PathBuf,
    archive: Mutex<Archive>,
    /// Entry prefixes in probe order: overlays highest release first, then
    /// the base root.
    prefixes: Vec<String>,
    releases: Vec<u16>,
}

impl ArchiveRoot {
    pub fn open(path: &Path) -> Result<Self, ResolveError> {
        let file = File::open(path).map_err(|source| ResolveError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut archive = ZipArchive::new(BufReader::new(file)).map_err(|source| {
            ResolveError::Zip {
                path: path.to_path_buf(),
                source,
            }
        })?;

        let base = if is_jmod(path) { JMOD_CLASSES_DIR } else { "" };
        let releases = if read_manifest(&mut archive, path, base)?
            .as_deref()
            .is_some_and(manifest::is_multi_release)
        {
            overlay_releases(&archive, base)
        } else {
            Vec::new()
        };

        let mut prefixes: Vec<String> = releases
            .iter()
            .map(|release| format!("{base}{VERSIONS_DIR}{release}/"))
            .collect();
        prefixes.push(base.to_string());

        debug!(
            path = %path.display(),
            entries = archive.len(),
            releases = ?releases,
            "opened archive root"
        );

        Ok(Self {
            path: path.to_path_buf(),
            archive: Mutex::new(archive),
            prefixes,
            releases,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overlay releases in probe order; empty unless the archive is multi-release.
    pub fn releases(&self) -> &[u16] {
        &self.releases
    }

    /// Reads `relative` from the first prefix that contains it.
    pub fn find(&self, relative: &str) -> Result<Option<ClassSource>, ResolveError> {
        let mut archive = self.lock();
        for prefix in &self.prefixes {
            let entry_name = format!("{prefix}{relative}");
            let mut entry = match archive.by_name(&entry_name) {
                Ok(entry) => entry,
                Err(ZipError::FileNotFound) => continue,
                Err(source) => {
                    return Err(ResolveError::Zip {
                        path: self.path.clone(),
                        source,
                    })
                }
            };
            if !entry.is_file() {
                continue;
            }

            let mut bytes = Vec::with_capacity(entry.size() as usize);
            entry
                .read_to_end(&mut bytes)
                .map_err(|source| ResolveError::Io {
                    path: self.path.clone(),
                    source,
                })?;
            return Ok(Some(ClassSource {
                bytes,
                origin: archive_entry_path(&self.path, &entry_name),
            }));
        }
        Ok(None)
    }

    fn lock(&self) -> MutexGuard<'_, Archive> {
        // A panic mid-read leaves the archive index intact.
        self.archive
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for ArchiveRoot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveRoot")
            .field("path", &self.path)
            .field("prefixes", &self.prefixes)
            .finish()
    }
}

pub(crate) fn is_jmod(path: &Path) -> bool {
    has_extension(path, &["jmod"])
}

pub(crate) fn is_archive(path: &Path) -> bool {
    has_extension(path, &["jar", "zip", "jmod"])
}

fn has_extension(path: &Path, values: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| values.iter().any(|value| ext.eq_ignore_ascii_case(value)))
        .unwrap_or(false)
}

fn read_manifest(
    archive: &mut Archive,
    path: &Path,
    base: &str,
) -> Result<Option<String>, ResolveError> {
    let name = format!("{base}{MANIFEST_PATH}");
    let mut entry = match archive.by_name(&name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(source) => {
            return Err(ResolveError::Zip {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let mut text = String::new();
    if entry.read_to_string(&mut text).is_err() {
        // An unreadable manifest only means "not multi-release".
        return Ok(None);
    }
    Ok(Some(text))
}

fn overlay_releases(archive: &Archive, base: &str) -> Vec<u16> {
    let versions_prefix = format!("{base}{VERSIONS_DIR}");
    manifest::overlay_order(archive.file_names().filter_map(|name| {
        let rest = name.strip_prefix(&versions_prefix)?;
        let (release, _) = rest.split_once('/')?;
        manifest::parse_release(release)
    }))
}

fn archive_entry_path(archive: &Path, entry: &str) -> PathBuf {
    let mut display = archive.display().to_string();
    display.push('!');
    display.push('/');
    display.push_str(entry);
    PathBuf::from(display)
}
