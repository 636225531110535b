use crate::descriptor::MethodDescriptor;
use indexmap::IndexMap;
use std::fmt;

/// A method flagged `ACC_NATIVE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeMethod {
    pub name: String,
    pub descriptor: MethodDescriptor,
    pub is_static: bool,
}

/// Value of a compile-time numeric constant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConstantValue {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
}

impl ConstantValue {
    /// C literal suffix for the value kind.
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Int(_) => "L",
            Self::Long(_) => "LL",
            Self::Float(_) => "f",
            Self::Double(_) => "",
        }
    }
}

impl fmt::Display for ConstantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Int(value) => write!(f, "{}", value),
            Self::Long(value) => write!(f, "{}", value),
            Self::Float(value) => write_float(f, &format!("{:?}", value), "f"),
            Self::Double(value) => write_float(f, &format!("{:?}", value), ""),
        }
    }
}

// Non-finite values have no C literal; spell them as constant expressions.
fn write_float(f: &mut fmt::Formatter<'_>, text: &str, suffix: &str) -> fmt::Result {
    match text {
        "NaN" => write!(f, "(0.0{suffix}/0.0{suffix})"),
        "inf" => write!(f, "(1.0{suffix}/0.0{suffix})"),
        "-inf" => write!(f, "(-1.0{suffix}/0.0{suffix})"),
        text if text.contains(['.', 'e', 'E']) => f.write_str(text),
        text => write!(f, "{}.0", text),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstantField {
    pub name: String,
    pub value: ConstantValue,
}

impl ConstantField {
    /// Literal text including the kind suffix, e.g. `42L`.
    pub fn literal(&self) -> String {
        let text = self.value.to_string();
        if text.starts_with('(') {
            // Expression forms already carry their suffixes.
            return text;
        }
        format!("{}{}", text, self.value.suffix())
    }
}

/// Facts extracted from one class file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassMetadata {
    /// Internal name of this class.
    pub name: String,
    /// `None` only for `java/lang/Object`.
    pub super_name: Option<String>,
    /// Overload groups keyed by method name, in first-encountered order.
    pub native_methods: IndexMap<String, Vec<NativeMethod>>,
    pub constants: Vec<ConstantField>,
}

impl ClassMetadata {
    pub fn new(name: impl Into<String>, super_name: Option<String>) -> Self {
        Self {
            name: name.into(),
            super_name,
            native_methods: IndexMap::new(),
            constants: Vec::new(),
        }
    }

    /// Adds a native method unless the same `(name, descriptor)` pair is
    /// already present. Returns whether the method was added.
    pub fn add_native_method(&mut self, method: NativeMethod) -> bool {
        let group = self.native_methods.entry(method.name.clone()).or_default();
        if group.iter().any(|existing| existing.descriptor == method.descriptor) {
            return false;
        }
        group.push(method);
        true
    }

    pub fn add_constant(&mut self, name: impl Into<String>, value: ConstantValue) {
        self.constants.push(ConstantField {
            name: name.into(),
            value,
        });
    }

    /// No native methods and no constants: nothing to emit.
    pub fn is_empty(&self) -> bool {
        self.native_methods.is_empty() && self.constants.is_empty()
    }

    /// Iterates `(method, overloaded)` pairs in declaration order.
    pub fn methods(&self) -> impl Iterator<Item = (&NativeMethod, bool)> {
        self.native_methods.values().flat_map(|group| {
            let overloaded = group.len() > 1;
            group.iter().map(move |method| (method, overloaded))
        })
    }
}
