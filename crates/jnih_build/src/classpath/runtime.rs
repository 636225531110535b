use super::archive::ArchiveRoot;
use super::module_path::ModulePathRoot;
use super::{ClassSource, ResolveError};
use crate::names::QualifiedClassName;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const LEGACY_RUNTIME_JARS: &[&str] = &["jre/lib/rt.jar", "lib/rt.jar"];

/// The standard library of a local JDK installation.
#[derive(Debug)]
pub struct RuntimeRoot {
    java_home: PathBuf,
    layout: RuntimeLayout,
}

#[derive(Debug)]
enum RuntimeLayout {
    /// JDK 9+: `jmods/*.jmod`.
    Jmods(ModulePathRoot),
    /// JDK 8 and earlier: a single `rt.jar`.
    RuntimeJar(ArchiveRoot),
}

impl RuntimeRoot {
    /// Locates the JDK from `java_home`, `JAVA_HOME`/`JDK_HOME`, or the `java`
    /// binary on `PATH`. Returns `None` when no usable installation exists.
    pub fn discover(java_home: Option<&Path>) -> Result<Option<Self>, ResolveError> {
        let Some(home) = java_home.map(Path::to_path_buf).or_else(detect_java_home) else {
            warn!("no JDK found; runtime classes will not be resolvable");
            return Ok(None);
        };
        Self::open(&home)
    }

    pub fn open(java_home: &Path) -> Result<Option<Self>, ResolveError> {
        let jmods = java_home.join("jmods");
        if jmods.is_dir() {
            debug!(java_home = %java_home.display(), "using jmods runtime layout");
            return Ok(Some(Self {
                java_home: java_home.to_path_buf(),
                layout: RuntimeLayout::Jmods(ModulePathRoot::open(&jmods)?),
            }));
        }

        for candidate in LEGACY_RUNTIME_JARS {
            let jar = java_home.join(candidate);
            if jar.is_file() {
                debug!(java_home = %java_home.display(), jar = %jar.display(), "using rt.jar runtime layout");
                return Ok(Some(Self {
                    java_home: java_home.to_path_buf(),
                    layout: RuntimeLayout::RuntimeJar(ArchiveRoot::open(&jar)?),
                }));
            }
        }

        warn!(
            java_home = %java_home.display(),
            "JDK has neither jmods nor rt.jar; runtime classes will not be resolvable"
        );
        Ok(None)
    }

    pub fn java_home(&self) -> &Path {
        &self.java_home
    }

    pub fn find(&self, name: &QualifiedClassName) -> Result<Option<ClassSource>, ResolveError> {
        match &self.layout {
            RuntimeLayout::Jmods(modules) => modules.find(name),
            RuntimeLayout::RuntimeJar(jar) => jar.find(&name.class_file_path()),
        }
    }
}

fn detect_java_home() -> Option<PathBuf> {
    for var in ["JAVA_HOME", "JDK_HOME"] {
        if let Ok(value) = env::var(var) {
            let candidate = PathBuf::from(value);
            if candidate.exists() {
                return Some(candidate);
            }
        }
    }

    if let Ok(java_path) = which::which("java") {
        // `/usr/bin/java` is usually a symlink into the real installation.
        let java_path = fs::canonicalize(&java_path).unwrap_or(java_path);
        if let Some(bin_dir) = java_path.parent() {
            if let Some(home) = bin_dir.parent() {
                return Some(home.to_path_buf());
            }
        }
    }

    None
}
