//! Class lookup across an ordered list of search roots.
//!
//! A [`ClassPath`] is built once from configuration and is read-only
//! afterwards. Roots are probed in order and the first hit wins; within a
//! multi-release root, version overlays are probed highest release first
//! before the unversioned tree.

mod archive;
mod args;
mod directory;
mod manifest;
mod module_path;
mod runtime;

pub use archive::ArchiveRoot;
pub use args::{expand_classpath, expand_module_path, PATH_SEPARATOR};
pub use directory::DirectoryRoot;
pub use manifest::SUPPORTED_RELEASES;
pub use module_path::ModulePathRoot;
pub use runtime::RuntimeRoot;

use crate::names::QualifiedClassName;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use zip::result::ZipError;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("IO error while reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("ZIP error while reading {path}: {source}")]
    Zip {
        path: PathBuf,
        #[source]
        source: ZipError,
    },
}

/// Class file bytes plus where they were found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSource {
    pub bytes: Vec<u8>,
    /// File path, or `archive!/entry` for archive members.
    pub origin: PathBuf,
}

/// One resolvable location.
#[derive(Debug)]
pub enum SearchRoot {
    Directory(DirectoryRoot),
    Archive(ArchiveRoot),
    ModulePath(ModulePathRoot),
    Runtime(RuntimeRoot),
}

impl SearchRoot {
    /// Opens a classpath entry. Missing paths and files that are not
    /// archives are skipped with a warning.
    pub fn classpath_entry(path: &Path) -> Result<Option<Self>, ResolveError> {
        if path.is_dir() {
            return DirectoryRoot::open(path).map(|root| Some(Self::Directory(root)));
        }
        if path.is_file() && archive::is_archive(path) {
            return ArchiveRoot::open(path).map(|root| Some(Self::Archive(root)));
        }
        if path.exists() {
            warn!(path = %path.display(), "ignoring classpath entry that is not a directory or archive");
        } else {
            warn!(path = %path.display(), "classpath entry not found");
        }
        Ok(None)
    }

    /// Opens a module path directory; anything else is skipped with a warning.
    pub fn module_path_entry(path: &Path) -> Result<Option<Self>, ResolveError> {
        if path.is_dir() {
            return ModulePathRoot::open(path).map(|root| Some(Self::ModulePath(root)));
        }
        if path.is_file() && archive::is_archive(path) {
            return ArchiveRoot::open(path).map(|root| Some(Self::Archive(root)));
        }
        warn!(path = %path.display(), "module path entry not found");
        Ok(None)
    }

    pub fn find(&self, name: &QualifiedClassName) -> Result<Option<ClassSource>, ResolveError> {
        match self {
            Self::Directory(root) => root.find(&name.class_file_path()),
            Self::Archive(root) => root.find(&name.class_file_path()),
            Self::ModulePath(root) => root.find(name),
            Self::Runtime(root) => root.find(name),
        }
    }

    pub fn is_runtime(&self) -> bool {
        matches!(self, Self::Runtime(_))
    }
}

impl fmt::Display for SearchRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Directory(root) => {
                write!(f, "directory {}", root.path().display())?;
                write_releases(f, root.releases())
            }
            Self::Archive(root) => {
                write!(f, "archive {}", root.path().display())?;
                write_releases(f, root.releases())
            }
            Self::ModulePath(root) => write!(f, "module path {}", root.path().display()),
            Self::Runtime(root) => write!(f, "runtime {}", root.java_home().display()),
        }
    }
}

fn write_releases(f: &mut fmt::Formatter<'_>, releases: &[u16]) -> fmt::Result {
    if releases.is_empty() {
        return Ok(());
    }
    let list: Vec<String> = releases.iter().map(u16::to_string).collect();
    write!(f, " (multi-release: {})", list.join(", "))
}

/// An ordered, immutable list of search roots.
#[derive(Debug, Default)]
pub struct ClassPath {
    roots: Vec<SearchRoot>,
}

impl ClassPath {
    pub fn builder() -> ClassPathBuilder {
        ClassPathBuilder::default()
    }

    pub fn roots(&self) -> &[SearchRoot] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Returns the bytes from the first root that holds `name`.
    pub fn resolve(&self, name: &QualifiedClassName) -> Result<Option<ClassSource>, ResolveError> {
        for root in &self.roots {
            if let Some(source) = root.find(name)? {
                debug!(class = %name, origin = %source.origin.display(), "resolved class");
                return Ok(Some(source));
            }
        }
        debug!(class = %name, roots = self.roots.len(), "class not found");
        Ok(None)
    }

    /// Human-readable list of roots, for diagnostics.
    pub fn describe(&self) -> Vec<String> {
        self.roots.iter().map(ToString::to_string).collect()
    }
}

/// Adds roots in probe order.
#[derive(Debug, Default)]
pub struct ClassPathBuilder {
    roots: Vec<SearchRoot>,
}

impl ClassPathBuilder {
    pub fn root(mut self, root: SearchRoot) -> Self {
        self.roots.push(root);
        self
    }

    pub fn classpath_entry(mut self, path: &Path) -> Result<Self, ResolveError> {
        if let Some(root) = SearchRoot::classpath_entry(path)? {
            self.roots.push(root);
        }
        Ok(self)
    }

    pub fn module_path_entry(mut self, path: &Path) -> Result<Self, ResolveError> {
        if let Some(root) = SearchRoot::module_path_entry(path)? {
            self.roots.push(root);
        }
        Ok(self)
    }

    /// Adds the JDK standard library if one can be found.
    pub fn runtime(mut self, java_home: Option<&Path>) -> Result<Self, ResolveError> {
        if let Some(root) = RuntimeRoot::discover(java_home)? {
            self.roots.push(SearchRoot::Runtime(root));
        }
        Ok(self)
    }

    pub fn build(self) -> ClassPath {
        ClassPath { roots: self.roots }
    }
}
