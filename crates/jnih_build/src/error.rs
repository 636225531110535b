use crate::classpath::ResolveError;
use crate::config::ConfigError;
use crate::metadata::ClassParseError;
use crate::names::NameError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JnihError {
    #[error(transparent)]
    InvalidName(#[from] NameError),
    #[error("could not find class file for '{class}' (searched: {})", searched_roots(.searched))]
    ClassNotFound { class: String, searched: Vec<String> },
    #[error("malformed class file for '{class}' at {origin}: {source}")]
    MalformedClass {
        class: String,
        origin: PathBuf,
        #[source]
        source: ClassParseError,
    },
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

fn searched_roots(searched: &[String]) -> String {
    if searched.is_empty() {
        "no search roots configured".to_string()
    } else {
        searched.join("; ")
    }
}
