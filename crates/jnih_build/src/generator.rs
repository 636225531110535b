//! Ties lookup, parsing and rendering together for one run.

use crate::classpath::{expand_classpath, expand_module_path, ClassPath};
use crate::config::{GeneratorConfig, OutputTarget};
use crate::emit::{self, WriteOutcome};
use crate::error::JnihError;
use crate::mangle::ClassHierarchy;
use crate::metadata::{parse_class, ClassMetadata, MetadataCache};
use crate::names::{NameError, QualifiedClassName};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One class argument: a class name looked up on the search roots, or a
/// class file read directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassRequest {
    Name(QualifiedClassName),
    File(PathBuf),
}

impl ClassRequest {
    /// An existing regular file is taken as a class file; anything else must
    /// be a class name.
    pub fn parse(input: &str) -> Result<Self, NameError> {
        let path = Path::new(input);
        if path.is_file() {
            return Ok(Self::File(path.to_path_buf()));
        }
        QualifiedClassName::parse(input).map(Self::Name)
    }
}

impl From<QualifiedClassName> for ClassRequest {
    fn from(name: QualifiedClassName) -> Self {
        Self::Name(name)
    }
}

impl fmt::Display for ClassRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => fmt::Display::fmt(name, f),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A class that could not be turned into a header.
#[derive(Debug)]
pub struct ClassFailure {
    pub class: String,
    pub error: JnihError,
}

/// What a [`HeaderGenerator::generate`] call did.
#[derive(Debug, Default)]
pub struct GenerationReport {
    /// Files whose contents changed.
    pub written: Vec<PathBuf>,
    /// Files that already held the rendered text.
    pub unchanged: Vec<PathBuf>,
    /// Classes without native methods or constants.
    pub skipped: Vec<String>,
    pub failures: Vec<ClassFailure>,
}

impl GenerationReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, path: PathBuf, outcome: WriteOutcome) {
        match outcome {
            WriteOutcome::Written => self.written.push(path),
            WriteOutcome::Unchanged => self.unchanged.push(path),
        }
    }
}

pub struct HeaderGenerator {
    classpath: ClassPath,
    cache: MetadataCache,
}

impl HeaderGenerator {
    /// Opens every configured root: classpath entries first, then the module
    /// path, then the JDK runtime when enabled.
    pub fn new(config: &GeneratorConfig) -> Result<Self, JnihError> {
        let mut builder = ClassPath::builder();
        for path in expand_classpath(&config.classpath) {
            builder = builder.classpath_entry(&path)?;
        }
        for path in expand_module_path(&config.module_path) {
            builder = builder.module_path_entry(&path)?;
        }
        if config.use_runtime {
            builder = builder.runtime(config.java_home.as_deref())?;
        }
        let classpath = builder.build();
        debug!(roots = ?classpath.describe(), "search roots");
        Ok(Self::from_classpath(classpath))
    }

    pub fn from_classpath(classpath: ClassPath) -> Self {
        Self {
            classpath,
            cache: MetadataCache::new(),
        }
    }

    /// Resolves and parses `name`, reusing earlier results.
    pub fn load(&mut self, name: &QualifiedClassName) -> Result<Arc<ClassMetadata>, JnihError> {
        let classpath = &self.classpath;
        self.cache
            .get_or_try_insert_with(name.internal_name(), || {
                let source = classpath
                    .resolve(name)?
                    .ok_or_else(|| JnihError::ClassNotFound {
                        class: name.to_string(),
                        searched: classpath.describe(),
                    })?;
                let metadata =
                    parse_class(&source.bytes).map_err(|source_error| JnihError::MalformedClass {
                        class: name.to_string(),
                        origin: source.origin.clone(),
                        source: source_error,
                    })?;
                if metadata.name != name.internal_name() {
                    warn!(
                        class = %name,
                        declared = %metadata.name,
                        origin = %source.origin.display(),
                        "class file declares a different name"
                    );
                }
                Ok(metadata)
            })
    }

    /// Parses a class file given by path. The result is cached under the
    /// name the file declares; an entry already cached under that name wins.
    pub fn load_file(&mut self, path: &Path) -> Result<Arc<ClassMetadata>, JnihError> {
        let bytes = fs::read(path).map_err(|source| JnihError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let metadata = parse_class(&bytes).map_err(|source| JnihError::MalformedClass {
            class: path.display().to_string(),
            origin: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), class = %metadata.name, "read class file");
        let name = metadata.name.clone();
        Ok(self.cache.insert(&name, metadata))
    }

    pub fn load_request(&mut self, request: &ClassRequest) -> Result<Arc<ClassMetadata>, JnihError> {
        match request {
            ClassRequest::Name(name) => self.load(name),
            ClassRequest::File(path) => self.load_file(path),
        }
    }

    /// Combined header text for `requests`; `None` when every class is empty.
    /// Stops at the first class that cannot be loaded.
    pub fn render(&mut self, requests: &[ClassRequest]) -> Result<Option<String>, JnihError> {
        let classes = requests
            .iter()
            .map(|request| self.load_request(request))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(emit::render_many(classes.iter().map(|class| &**class), self))
    }

    /// Writes headers for `requests`. Classes are handled independently: a
    /// class that fails is recorded in the report and the rest are still
    /// written.
    pub fn generate(
        &mut self,
        requests: &[ClassRequest],
        target: &OutputTarget,
    ) -> Result<GenerationReport, JnihError> {
        let mut report = GenerationReport::default();
        let mut classes = Vec::with_capacity(requests.len());
        for request in requests {
            match self.load_request(request) {
                Ok(class) => classes.push(class),
                Err(error) => {
                    warn!(class = %request, error = %error, "skipping class");
                    report.failures.push(ClassFailure {
                        class: request.to_string(),
                        error,
                    });
                }
            }
        }
        for class in classes.iter().filter(|class| class.is_empty()) {
            debug!(class = %class.name, "no native methods or constants");
            report.skipped.push(class.name.clone());
        }

        match target {
            OutputTarget::SingleFile(path) => {
                if let Some(text) = emit::render_many(classes.iter().map(|class| &**class), self) {
                    let outcome = emit::write_if_changed(path, &text)?;
                    report.record(path.clone(), outcome);
                }
            }
            OutputTarget::PerClass(dir) => {
                for class in &classes {
                    let Some(text) = emit::render_one(class, self) else {
                        continue;
                    };
                    let path = dir.join(emit::header_file_name(&class.name));
                    match emit::write_if_changed(&path, &text) {
                        Ok(outcome) => report.record(path, outcome),
                        Err(error) => report.failures.push(ClassFailure {
                            class: class.name.replace('/', "."),
                            error,
                        }),
                    }
                }
            }
        }

        info!(
            written = report.written.len(),
            unchanged = report.unchanged.len(),
            skipped = report.skipped.len(),
            failed = report.failures.len(),
            "header generation finished"
        );
        Ok(report)
    }
}

impl ClassHierarchy for HeaderGenerator {
    fn superclass_of(&mut self, internal_name: &str) -> Option<String> {
        let name = QualifiedClassName::from_internal(internal_name).ok()?;
        match self.load(&name) {
            Ok(class) => class.super_name.clone(),
            Err(error) => {
                debug!(class = internal_name, error = %error, "superclass lookup failed");
                None
            }
        }
    }

    fn can_resolve(&self) -> bool {
        !self.classpath.is_empty()
    }
}
