//! C header rendering and change-detecting writes.

use crate::error::JnihError;
use crate::mangle::{self, ClassHierarchy};
use crate::metadata::{ClassMetadata, NativeMethod};
use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;

/// Emitted once, ahead of the first class in a file.
pub const FILE_BANNER: &str =
    "/* DO NOT EDIT THIS FILE - it is machine generated */\n#include <jni.h>\n";

/// Result of [`write_if_changed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    Unchanged,
}

/// Header for a single class, banner included. `None` when the class has
/// neither native methods nor constants.
pub fn render_one(class: &ClassMetadata, hierarchy: &mut dyn ClassHierarchy) -> Option<String> {
    if class.is_empty() {
        return None;
    }
    let mut out = String::from(FILE_BANNER);
    render_class(class, hierarchy, &mut out);
    Some(out)
}

/// One combined header; only the first non-empty class carries the banner.
/// `None` when every class is empty.
pub fn render_many<'a, I>(classes: I, hierarchy: &mut dyn ClassHierarchy) -> Option<String>
where
    I: IntoIterator<Item = &'a ClassMetadata>,
{
    let mut out = String::new();
    for class in classes.into_iter().filter(|class| !class.is_empty()) {
        if out.is_empty() {
            out.push_str(FILE_BANNER);
        }
        render_class(class, hierarchy, &mut out);
    }
    (!out.is_empty()).then_some(out)
}

/// Appends the guarded block for one class.
pub fn render_class(class: &ClassMetadata, hierarchy: &mut dyn ClassHierarchy, out: &mut String) {
    let mangled = mangle::mangle_class_name(&class.name);
    let guard_name = mangled.replace("_00024", "_");

    out.push_str(&format!("/* Header for class {} */\n\n", guard_name));
    out.push_str(&format!("#ifndef _Included_{}\n", guard_name));
    out.push_str(&format!("#define _Included_{}\n", guard_name));
    out.push_str("#ifdef __cplusplus\nextern \"C\" {\n#endif\n");

    for constant in &class.constants {
        let macro_name = format!("{}_{}", mangled, constant.name);
        out.push_str(&format!("#undef {}\n", macro_name));
        out.push_str(&format!("#define {} {}\n", macro_name, constant.literal()));
    }

    let readable_class = readable_class_name(&class.name);
    for (method, overloaded) in class.methods() {
        render_method(&class.name, &readable_class, method, overloaded, hierarchy, out);
    }

    out.push_str("#ifdef __cplusplus\n}\n#endif\n#endif\n");
}

fn render_method(
    class_name: &str,
    readable_class: &str,
    method: &NativeMethod,
    overloaded: bool,
    hierarchy: &mut dyn ClassHierarchy,
    out: &mut String,
) {
    let descriptor = &method.descriptor;
    out.push_str("/*\n");
    out.push_str(&format!(" * Class:     {}\n", readable_class));
    out.push_str(&format!(" * Method:    {}\n", method.name));
    out.push_str(&format!(
        " * Signature: {}\n",
        descriptor.to_string().replace('$', "/")
    ));
    out.push_str(" */\n");

    let symbol =
        mangle::mangle_method_symbol(class_name, &method.name, overloaded.then_some(descriptor));
    let return_type = mangle::native_return_type(&descriptor.return_type, hierarchy);

    let receiver = if method.is_static { "jclass" } else { "jobject" };
    let mut parameters = vec!["JNIEnv *".to_string(), receiver.to_string()];
    for parameter in &descriptor.parameters {
        parameters.push(mangle::native_type(parameter, hierarchy).to_string());
    }

    out.push_str(&format!(
        "JNIEXPORT {} JNICALL {} ({});\n\n",
        return_type,
        symbol,
        parameters.join(", ")
    ));
}

/// `a/b/Outer$Inner` → `a_b_Outer_Inner`; used in comments.
fn readable_class_name(internal_name: &str) -> String {
    internal_name.replace(['.', '/', '$'], "_")
}

/// File name for a per-class header: `a_b_Outer_Inner.h`.
pub fn header_file_name(internal_name: &str) -> String {
    format!("{}.h", internal_name.replace(['/', '$'], "_"))
}

/// Writes `text` to `path` unless the file already holds exactly `text`.
/// Parent directories are created as needed.
pub fn write_if_changed(path: &Path, text: &str) -> Result<WriteOutcome, JnihError> {
    match fs::read(path) {
        Ok(existing) if existing == text.as_bytes() => {
            debug!(path = %path.display(), "header unchanged");
            return Ok(WriteOutcome::Unchanged);
        }
        Ok(_) => {}
        Err(error) if error.kind() == io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(JnihError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    }

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| JnihError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, text).map_err(|source| JnihError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = text.len(), "header written");
    Ok(WriteOutcome::Written)
}
