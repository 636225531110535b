//! JNI symbol mangling and descriptor-to-native-type mapping.

use crate::descriptor::{FieldType, MethodDescriptor, PrimitiveType, ReturnType};
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

/// Root of the exception hierarchy.
pub const THROWABLE_ROOT: &str = "java/lang/Throwable";

/// Used instead of a superclass walk when nothing can be resolved.
const WELL_KNOWN_THROWABLES: &[&str] = &[
    "java/lang/Throwable",
    "java/lang/Error",
    "java/lang/Exception",
    "java/lang/RuntimeException",
];

/// Escapes a name or descriptor fragment for embedding in a JNI symbol.
///
/// `_` → `_1`, `;` → `_2`, `[` → `_3`, `/` → `_`, ASCII letters and digits
/// pass through, and every other UTF-16 code unit becomes `_0xxxx`.
pub fn escape(source: &str) -> String {
    let mut escaped = String::with_capacity(source.len());
    for unit in source.encode_utf16() {
        match char::from_u32(unit as u32) {
            Some('_') => escaped.push_str("_1"),
            Some(';') => escaped.push_str("_2"),
            Some('[') => escaped.push_str("_3"),
            Some('/') => escaped.push('_'),
            Some(ch) if ch.is_ascii_alphanumeric() => escaped.push(ch),
            _ => escaped.push_str(&format!("_0{:04x}", unit)),
        }
    }
    escaped
}

/// Mangled form of an internal class name, e.g. `a_b_C` for `a/b/C`.
pub fn mangle_class_name(internal_name: &str) -> String {
    escape(internal_name)
}

/// `Java_<class>_<method>`, plus `__<params>` for overloaded methods.
pub fn mangle_method_symbol(
    class_internal_name: &str,
    method_name: &str,
    overload: Option<&MethodDescriptor>,
) -> String {
    let mut symbol = format!(
        "Java_{}_{}",
        mangle_class_name(class_internal_name),
        escape(method_name)
    );
    if let Some(descriptor) = overload {
        symbol.push_str("__");
        symbol.push_str(&escape(&descriptor.parameter_descriptors()));
    }
    symbol
}

/// JNI type names used in declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeType {
    Void,
    Primitive(PrimitiveType),
    PrimitiveArray(PrimitiveType),
    String,
    Class,
    Throwable,
    Object,
    ObjectArray,
}

impl NativeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Void => "void",
            Self::Primitive(primitive) => primitive_name(*primitive),
            Self::PrimitiveArray(primitive) => primitive_array_name(*primitive),
            Self::String => "jstring",
            Self::Class => "jclass",
            Self::Throwable => "jthrowable",
            Self::Object => "jobject",
            Self::ObjectArray => "jobjectArray",
        }
    }
}

impl fmt::Display for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn primitive_name(primitive: PrimitiveType) -> &'static str {
    match primitive {
        PrimitiveType::Boolean => "jboolean",
        PrimitiveType::Byte => "jbyte",
        PrimitiveType::Char => "jchar",
        PrimitiveType::Short => "jshort",
        PrimitiveType::Int => "jint",
        PrimitiveType::Long => "jlong",
        PrimitiveType::Float => "jfloat",
        PrimitiveType::Double => "jdouble",
    }
}

fn primitive_array_name(primitive: PrimitiveType) -> &'static str {
    match primitive {
        PrimitiveType::Boolean => "jbooleanArray",
        PrimitiveType::Byte => "jbyteArray",
        PrimitiveType::Char => "jcharArray",
        PrimitiveType::Short => "jshortArray",
        PrimitiveType::Int => "jintArray",
        PrimitiveType::Long => "jlongArray",
        PrimitiveType::Float => "jfloatArray",
        PrimitiveType::Double => "jdoubleArray",
    }
}

/// Superclass lookups for throwable detection.
pub trait ClassHierarchy {
    /// Superclass of `internal_name`, or `None` when the class is the root,
    /// cannot be found, or cannot be parsed.
    fn superclass_of(&mut self, internal_name: &str) -> Option<String>;

    /// `false` when there is nothing to look classes up in; throwable
    /// detection then falls back to a fixed list of well-known types.
    fn can_resolve(&self) -> bool {
        true
    }
}

/// A hierarchy with no search roots.
#[derive(Debug, Clone, Copy, Default)]
pub struct WellKnownHierarchy;

impl ClassHierarchy for WellKnownHierarchy {
    fn superclass_of(&mut self, _internal_name: &str) -> Option<String> {
        None
    }

    fn can_resolve(&self) -> bool {
        false
    }
}

/// Whether `internal_name` extends `java/lang/Throwable`.
///
/// Lookup failures and cycles answer `false`.
pub fn is_throwable(internal_name: &str, hierarchy: &mut dyn ClassHierarchy) -> bool {
    if !hierarchy.can_resolve() {
        return WELL_KNOWN_THROWABLES.contains(&internal_name);
    }

    let mut seen = HashSet::new();
    let mut current = internal_name.to_string();
    loop {
        if current == THROWABLE_ROOT {
            return true;
        }
        if !seen.insert(current.clone()) {
            debug!(class = internal_name, at = %current, "superclass cycle");
            return false;
        }
        match hierarchy.superclass_of(&current) {
            Some(parent) => current = parent,
            None => return false,
        }
    }
}

pub fn native_type(ty: &FieldType, hierarchy: &mut dyn ClassHierarchy) -> NativeType {
    match ty {
        FieldType::Primitive(primitive) => NativeType::Primitive(*primitive),
        FieldType::Array(element) => match element.as_ref() {
            FieldType::Primitive(primitive) => NativeType::PrimitiveArray(*primitive),
            _ => NativeType::ObjectArray,
        },
        FieldType::Object(name) => match name.as_str() {
            "java/lang/String" => NativeType::String,
            "java/lang/Class" => NativeType::Class,
            name if is_throwable(name, hierarchy) => NativeType::Throwable,
            _ => NativeType::Object,
        },
    }
}

pub fn native_return_type(ty: &ReturnType, hierarchy: &mut dyn ClassHierarchy) -> NativeType {
    match ty {
        ReturnType::Void => NativeType::Void,
        ReturnType::Value(ty) => native_type(ty, hierarchy),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use test_case::test_case;

    /// Fixed superclass table.
    struct TableHierarchy {
        parents: HashMap<&'static str, &'static str>,
        lookups: usize,
    }

    impl TableHierarchy {
        fn new(pairs: &[(&'static str, &'static str)]) -> Self {
            Self {
                parents: pairs.iter().copied().collect(),
                lookups: 0,
            }
        }
    }

    impl ClassHierarchy for TableHierarchy {
        fn superclass_of(&mut self, internal_name: &str) -> Option<String> {
            self.lookups += 1;
            self.parents.get(internal_name).map(|parent| parent.to_string())
        }
    }

    #[test_case("a/b/C", "a_b_C")]
    #[test_case("my_pkg/Foo", "my_1pkg_Foo")]
    #[test_case("a/Outer$Inner", "a_Outer_00024Inner")]
    #[test_case("[I", "_3I")]
    #[test_case("Ljava/lang/String;", "Ljava_lang_String_2")]
    #[test_case("é", "_000e9")]
    #[test_case("\u{1F600}", "_0d83d_0de00")]
    fn escapes(input: &str, expected: &str) {
        assert_eq!(escape(input), expected);
    }

    #[test]
    fn escape_output_alphabet_and_injectivity() {
        let inputs = [
            "a_b", "a_1b", "a/b", "a$b", "a;b", "a[b", "a_2b", "a_3b", "a_00024b", "ab", "a.b",
            "名前", "a b", "_", "__", "_1",
        ];
        let mut outputs = HashSet::new();
        for input in inputs {
            let escaped = escape(input);
            assert!(
                escaped.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_'),
                "{escaped}"
            );
            if !input.contains('/') {
                assert!(outputs.insert(escaped), "collision for {input}");
            }
        }
    }

    #[test]
    fn symbol_without_overload_suffix() {
        assert_eq!(mangle_method_symbol("a/b/C", "foo", None), "Java_a_b_C_foo");
        assert_eq!(
            mangle_method_symbol("a/b/C", "do_it", None),
            "Java_a_b_C_do_1it"
        );
    }

    #[test]
    fn symbol_with_overload_suffix() {
        let int = MethodDescriptor::parse("(I)V").unwrap();
        let string = MethodDescriptor::parse("(Ljava/lang/String;[[J)I").unwrap();
        let none = MethodDescriptor::parse("()V").unwrap();
        assert_eq!(mangle_method_symbol("a/b/C", "foo", Some(&int)), "Java_a_b_C_foo__I");
        assert_eq!(
            mangle_method_symbol("a/b/C", "foo", Some(&string)),
            "Java_a_b_C_foo__Ljava_lang_String_2_3_3J"
        );
        assert_eq!(mangle_method_symbol("a/b/C", "foo", Some(&none)), "Java_a_b_C_foo__");
    }

    #[test_case("Z", "jboolean")]
    #[test_case("B", "jbyte")]
    #[test_case("C", "jchar")]
    #[test_case("S", "jshort")]
    #[test_case("I", "jint")]
    #[test_case("J", "jlong")]
    #[test_case("F", "jfloat")]
    #[test_case("D", "jdouble")]
    #[test_case("[Z", "jbooleanArray")]
    #[test_case("[D", "jdoubleArray")]
    #[test_case("[[I", "jobjectArray")]
    #[test_case("[Ljava/lang/String;", "jobjectArray")]
    #[test_case("Ljava/lang/String;", "jstring")]
    #[test_case("Ljava/lang/Class;", "jclass")]
    #[test_case("Ljava/lang/Object;", "jobject")]
    #[test_case("Ljava/lang/Throwable;", "jthrowable")]
    #[test_case("Ljava/lang/RuntimeException;", "jthrowable")]
    #[test_case("Ljava/io/IOException;", "jobject" ; "not in well known list")]
    fn maps_without_search_roots(descriptor: &str, expected: &str) {
        let ty = FieldType::parse(descriptor).unwrap();
        assert_eq!(native_type(&ty, &mut WellKnownHierarchy).as_str(), expected);
    }

    #[test]
    fn mapping_is_pure() {
        let ty = FieldType::parse("Lx/Failure;").unwrap();
        let mut hierarchy =
            TableHierarchy::new(&[("x/Failure", "java/lang/Exception"), ("java/lang/Exception", THROWABLE_ROOT)]);
        let first = native_type(&ty, &mut hierarchy);
        let second = native_type(&ty, &mut hierarchy);
        assert_eq!(first, NativeType::Throwable);
        assert_eq!(first, second);
    }

    #[test]
    fn walks_superclass_chain() {
        let mut hierarchy = TableHierarchy::new(&[
            ("x/DeepFailure", "x/Failure"),
            ("x/Failure", "java/lang/Exception"),
            ("java/lang/Exception", THROWABLE_ROOT),
            ("x/Plain", "java/lang/Object"),
        ]);
        assert!(is_throwable("x/DeepFailure", &mut hierarchy));
        assert!(!is_throwable("x/Plain", &mut hierarchy));
        assert!(!is_throwable("x/Unknown", &mut hierarchy));
    }

    #[test]
    fn cycles_terminate() {
        let mut hierarchy = TableHierarchy::new(&[("x/A", "x/B"), ("x/B", "x/A")]);
        assert!(!is_throwable("x/A", &mut hierarchy));
        assert_eq!(hierarchy.lookups, 2);
    }

    #[test]
    fn return_types() {
        let descriptor = MethodDescriptor::parse("()V").unwrap();
        assert_eq!(
            native_return_type(&descriptor.return_type, &mut WellKnownHierarchy),
            NativeType::Void
        );
    }
}
