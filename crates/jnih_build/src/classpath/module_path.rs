use super::archive::{is_archive, ArchiveRoot};
use super::{ClassSource, ResolveError};
use crate::names::QualifiedClassName;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A directory whose archive files are modules (`*.jmod`, modular jars).
#[derive(Debug)]
pub struct ModulePathRoot {
    path: PathBuf,
    modules: Vec<ModuleArchive>,
}

#[derive(Debug)]
struct ModuleArchive {
    /// File stem, e.g. `java.base` for `java.base.jmod`.
    name: String,
    root: ArchiveRoot,
}

impl ModulePathRoot {
    pub fn open(path: &Path) -> Result<Self, ResolveError> {
        let entries = fs::read_dir(path).map_err(|source| ResolveError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| ResolveError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let entry_path = entry.path();
            if entry_path.is_file() && is_archive(&entry_path) {
                files.push(entry_path);
            }
        }
        files.sort();

        let mut modules = Vec::with_capacity(files.len());
        for file in files {
            let name = file
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
            modules.push(ModuleArchive {
                name,
                root: ArchiveRoot::open(&file)?,
            });
        }

        debug!(path = %path.display(), modules = modules.len(), "opened module path");

        Ok(Self {
            path: path.to_path_buf(),
            modules,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(|module| module.name.as_str())
    }

    /// Probes member archives in file-name order. A module-qualified class
    /// name only probes the matching module when one exists.
    pub fn find(&self, name: &QualifiedClassName) -> Result<Option<ClassSource>, ResolveError> {
        let relative = name.class_file_path();

        if let Some(hint) = name.module() {
            if let Some(module) = self.modules.iter().find(|module| module.name == hint) {
                return module.root.find(&relative);
            }
        }

        for module in &self.modules {
            if let Some(source) = module.root.find(&relative)? {
                return Ok(Some(source));
            }
        }
        Ok(None)
    }
}
