use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const PATH_SEPARATOR: char = if cfg!(windows) { ';' } else { ':' };

/// Splits classpath arguments on the platform separator and expands
/// `dir/*` wildcards to the jar files in `dir` (sorted by name).
pub fn expand_classpath(raw: &[String]) -> Vec<PathBuf> {
    let mut result = Vec::new();
    for entry in raw {
        for part in entry.split(PATH_SEPARATOR) {
            if part.trim().is_empty() {
                continue;
            }
            match wildcard_dir(part) {
                Some(dir) => result.extend(jars_in(dir)),
                None => result.push(PathBuf::from(part)),
            }
        }
    }
    result
}

/// Splits module path arguments on the platform separator.
pub fn expand_module_path(raw: &[String]) -> Vec<PathBuf> {
    raw.iter()
        .flat_map(|entry| entry.split(PATH_SEPARATOR))
        .filter(|part| !part.trim().is_empty())
        .map(PathBuf::from)
        .collect()
}

fn wildcard_dir(part: &str) -> Option<&Path> {
    let dir = part
        .strip_suffix("/*")
        .or_else(|| part.strip_suffix(&format!("{}*", std::path::MAIN_SEPARATOR)))?;
    Some(Path::new(if dir.is_empty() { "/" } else { dir }))
}

fn jars_in(dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(error) => {
            warn!(path = %dir.display(), %error, "cannot expand classpath wildcard");
            return Vec::new();
        }
    };

    let mut jars: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("jar"))
        })
        .collect();
    jars.sort();
    jars
}
