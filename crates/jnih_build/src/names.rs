//! Class and member name grammar.
//!
//! A [`QualifiedClassName`] is parsed once from user input (dotted binary
//! name, slash-separated internal name, or `module/binary.Name`) and is
//! immutable afterwards. Both views are derived from the internal form.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const FORBIDDEN_IN_NAMES: &[char] = &['\\', ';', '['];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("class name is empty")]
    Empty,
    #[error("illegal class name '{0}'")]
    IllegalClassName(String),
    #[error("illegal module name '{module}' in '{input}'")]
    IllegalModuleName { module: String, input: String },
}

/// A validated class name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedClassName {
    internal: String,
    module: Option<String>,
}

impl QualifiedClassName {
    /// Parses any of the accepted spellings.
    pub fn parse(input: &str) -> Result<Self, NameError> {
        if input.is_empty() {
            return Err(NameError::Empty);
        }
        if input.contains(FORBIDDEN_IN_NAMES) {
            return Err(NameError::IllegalClassName(input.to_string()));
        }

        match (input.contains('/'), input.contains('.')) {
            (true, true) => {
                let (module, class) = input
                    .split_once('/')
                    .ok_or_else(|| NameError::IllegalClassName(input.to_string()))?;
                if !is_valid_full_name(module) {
                    return Err(NameError::IllegalModuleName {
                        module: module.to_string(),
                        input: input.to_string(),
                    });
                }
                if !is_valid_full_name(class) {
                    return Err(NameError::IllegalClassName(input.to_string()));
                }
                Ok(Self {
                    internal: class.replace('.', "/"),
                    module: Some(module.to_string()),
                })
            }
            (true, false) => Self::from_internal(input),
            (false, _) => {
                if !is_valid_full_name(input) {
                    return Err(NameError::IllegalClassName(input.to_string()));
                }
                Ok(Self {
                    internal: input.replace('.', "/"),
                    module: None,
                })
            }
        }
    }

    /// Builds a name from the slash-separated form found inside class files.
    pub fn from_internal(internal: &str) -> Result<Self, NameError> {
        if internal.is_empty() {
            return Err(NameError::Empty);
        }
        let valid = !internal.contains(FORBIDDEN_IN_NAMES)
            && internal.split('/').all(is_valid_simple_name);
        if !valid {
            return Err(NameError::IllegalClassName(internal.to_string()));
        }
        Ok(Self {
            internal: internal.to_string(),
            module: None,
        })
    }

    /// `java/lang/String`
    pub fn internal_name(&self) -> &str {
        &self.internal
    }

    /// `java.lang.String`
    pub fn binary_name(&self) -> String {
        self.internal.replace('/', ".")
    }

    pub fn module(&self) -> Option<&str> {
        self.module.as_deref()
    }

    /// Relative path of the class file inside a search root.
    pub fn class_file_path(&self) -> String {
        format!("{}.class", self.internal)
    }
}

impl fmt::Display for QualifiedClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(module) = &self.module {
            write!(f, "{}/", module)?;
        }
        f.write_str(&self.binary_name())
    }
}

impl FromStr for QualifiedClassName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// An unqualified name: no `.`, `;`, `[` or `/`.
pub fn is_valid_simple_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(['.', ';', '[', '/'])
}

/// A dotted binary name made of simple names.
pub fn is_valid_full_name(name: &str) -> bool {
    !name.contains(FORBIDDEN_IN_NAMES) && name.split('.').all(is_valid_simple_name)
}

/// A method name: a simple name without angle brackets, or one of the
/// special `<init>` / `<clinit>` names.
pub fn is_valid_method_name(name: &str) -> bool {
    if name == "<init>" || name == "<clinit>" {
        return true;
    }
    is_valid_simple_name(name) && !name.contains(['<', '>'])
}
