use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("can't mix a single output file with a per-class output directory")]
    AmbiguousOutputTarget,
    #[error("failed to read configuration {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid configuration {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Generator settings, loadable from a TOML file.
///
/// ```toml
/// classpath = ["build/classes", "libs/*"]
/// module-path = ["mods"]
/// use-runtime = true
/// java-home = "/usr/lib/jvm/java-21"
/// output-dir = "include"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Classpath entries (directories, jars, `dir/*` wildcards). Entries may
    /// themselves be separator-joined lists.
    pub classpath: Vec<String>,
    /// Module path entries: directories of jmods or modular jars.
    pub module_path: Vec<String>,
    /// Probe the JDK standard library after the configured roots.
    pub use_runtime: bool,
    /// JDK to use for the runtime root; discovered when unset.
    pub java_home: Option<PathBuf>,
    pub output_file: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            classpath: Vec::new(),
            module_path: Vec::new(),
            use_runtime: true,
            java_home: None,
            output_file: None,
            output_dir: None,
        }
    }
}

impl GeneratorConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn with_classpath<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.classpath.extend(entries.into_iter().map(Into::into));
        self
    }

    pub fn with_module_path<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.module_path.extend(entries.into_iter().map(Into::into));
        self
    }

    pub fn with_runtime(mut self, use_runtime: bool) -> Self {
        self.use_runtime = use_runtime;
        self
    }

    pub fn with_java_home(mut self, java_home: impl Into<PathBuf>) -> Self {
        self.java_home = Some(java_home.into());
        self
    }

    pub fn output_target(&self) -> Result<OutputTarget, ConfigError> {
        OutputTarget::from_options(self.output_file.clone(), self.output_dir.clone())
    }
}

/// Where headers go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Every class into one combined header.
    SingleFile(PathBuf),
    /// One header per class inside the directory.
    PerClass(PathBuf),
}

impl OutputTarget {
    /// Defaults to per-class headers in the current directory.
    pub fn from_options(
        file: Option<PathBuf>,
        dir: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        match (file, dir) {
            (Some(_), Some(_)) => Err(ConfigError::AmbiguousOutputTarget),
            (Some(file), None) => Ok(Self::SingleFile(file)),
            (None, Some(dir)) => Ok(Self::PerClass(dir)),
            (None, None) => Ok(Self::PerClass(PathBuf::from("."))),
        }
    }
}
