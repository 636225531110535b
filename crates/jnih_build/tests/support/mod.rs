#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_FINAL: u16 = 0x0010;
pub const ACC_NATIVE: u16 = 0x0100;

#[derive(Clone, Copy)]
enum Literal {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Str(&'static str),
}

struct Field {
    access: u16,
    name: String,
    descriptor: String,
    value: Option<Literal>,
}

struct Method {
    access: u16,
    name: String,
    descriptor: String,
    code: Option<Vec<u8>>,
}

/// Assembles minimal class files for tests.
pub struct ClassFileBuilder {
    name: String,
    super_name: Option<String>,
    major: u16,
    fields: Vec<Field>,
    methods: Vec<Method>,
}

impl ClassFileBuilder {
    pub fn new(internal_name: &str) -> Self {
        Self {
            name: internal_name.to_string(),
            super_name: Some("java/lang/Object".to_string()),
            major: 52,
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn extends(mut self, super_name: Option<&str>) -> Self {
        self.super_name = super_name.map(str::to_string);
        self
    }

    pub fn major_version(mut self, major: u16) -> Self {
        self.major = major;
        self
    }

    pub fn native_method(self, name: &str, descriptor: &str) -> Self {
        self.method(ACC_PUBLIC | ACC_NATIVE, name, descriptor, None)
    }

    pub fn static_native_method(self, name: &str, descriptor: &str) -> Self {
        self.method(ACC_PUBLIC | ACC_STATIC | ACC_NATIVE, name, descriptor, None)
    }

    /// A regular method with a `Code` attribute holding `return`.
    pub fn java_method(self, name: &str, descriptor: &str) -> Self {
        let mut code = Vec::new();
        code.extend_from_slice(&1u16.to_be_bytes()); // max_stack
        code.extend_from_slice(&1u16.to_be_bytes()); // max_locals
        code.extend_from_slice(&1u32.to_be_bytes());
        code.push(0xB1);
        code.extend_from_slice(&0u16.to_be_bytes()); // exception table
        code.extend_from_slice(&0u16.to_be_bytes()); // attributes
        self.method(ACC_PUBLIC, name, descriptor, Some(code))
    }

    pub fn method(mut self, access: u16, name: &str, descriptor: &str, code: Option<Vec<u8>>) -> Self {
        self.methods.push(Method {
            access,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            code,
        });
        self
    }

    pub fn int_constant(self, name: &str, value: i32) -> Self {
        self.static_field(name, "I", Literal::Int(value))
    }

    pub fn long_constant(self, name: &str, value: i64) -> Self {
        self.static_field(name, "J", Literal::Long(value))
    }

    pub fn float_constant(self, name: &str, value: f32) -> Self {
        self.static_field(name, "F", Literal::Float(value))
    }

    pub fn double_constant(self, name: &str, value: f64) -> Self {
        self.static_field(name, "D", Literal::Double(value))
    }

    pub fn string_constant(self, name: &str, value: &'static str) -> Self {
        self.static_field(name, "Ljava/lang/String;", Literal::Str(value))
    }

    /// A final instance field carrying a `ConstantValue`; readers ignore it.
    pub fn instance_int_field(mut self, name: &str, value: i32) -> Self {
        self.fields.push(Field {
            access: ACC_PUBLIC | ACC_FINAL,
            name: name.to_string(),
            descriptor: "I".to_string(),
            value: Some(Literal::Int(value)),
        });
        self
    }

    fn static_field(mut self, name: &str, descriptor: &str, value: Literal) -> Self {
        self.fields.push(Field {
            access: ACC_PUBLIC | ACC_STATIC | ACC_FINAL,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            value: Some(value),
        });
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut pool = PoolWriter::default();
        let this_class = pool.class(&self.name);
        let super_class = self
            .super_name
            .as_deref()
            .map(|name| pool.class(name))
            .unwrap_or(0);

        let mut body = Vec::new();
        put_u2(&mut body, ACC_PUBLIC);
        put_u2(&mut body, this_class);
        put_u2(&mut body, super_class);
        put_u2(&mut body, 0); // interfaces

        put_u2(&mut body, self.fields.len() as u16);
        for field in &self.fields {
            put_u2(&mut body, field.access);
            put_u2(&mut body, pool.utf8(&field.name));
            put_u2(&mut body, pool.utf8(&field.descriptor));
            match field.value {
                Some(value) => {
                    put_u2(&mut body, 1);
                    put_u2(&mut body, pool.utf8("ConstantValue"));
                    body.extend_from_slice(&2u32.to_be_bytes());
                    put_u2(&mut body, pool.literal(value));
                }
                None => put_u2(&mut body, 0),
            }
        }

        put_u2(&mut body, self.methods.len() as u16);
        for method in &self.methods {
            put_u2(&mut body, method.access);
            put_u2(&mut body, pool.utf8(&method.name));
            put_u2(&mut body, pool.utf8(&method.descriptor));
            match &method.code {
                Some(code) => {
                    put_u2(&mut body, 1);
                    put_u2(&mut body, pool.utf8("Code"));
                    body.extend_from_slice(&(code.len() as u32).to_be_bytes());
                    body.extend_from_slice(code);
                }
                None => put_u2(&mut body, 0),
            }
        }

        put_u2(&mut body, 1);
        put_u2(&mut body, pool.utf8("SourceFile"));
        body.extend_from_slice(&2u32.to_be_bytes());
        put_u2(&mut body, pool.utf8("Generated.java"));

        let mut out = Vec::new();
        out.extend_from_slice(&0xCAFE_BABEu32.to_be_bytes());
        put_u2(&mut out, 0);
        put_u2(&mut out, self.major);
        put_u2(&mut out, pool.next_index);
        out.extend_from_slice(&pool.bytes);
        out.extend_from_slice(&body);
        out
    }
}

struct PoolWriter {
    bytes: Vec<u8>,
    next_index: u16,
    utf8: HashMap<String, u16>,
    classes: HashMap<String, u16>,
}

impl Default for PoolWriter {
    fn default() -> Self {
        Self {
            bytes: Vec::new(),
            next_index: 1,
            utf8: HashMap::new(),
            classes: HashMap::new(),
        }
    }
}

impl PoolWriter {
    fn utf8(&mut self, value: &str) -> u16 {
        if let Some(index) = self.utf8.get(value) {
            return *index;
        }
        self.bytes.push(1);
        put_u2(&mut self.bytes, value.len() as u16);
        self.bytes.extend_from_slice(value.as_bytes());
        let index = self.take(1);
        self.utf8.insert(value.to_string(), index);
        index
    }

    fn class(&mut self, name: &str) -> u16 {
        if let Some(index) = self.classes.get(name) {
            return *index;
        }
        let name_index = self.utf8(name);
        self.bytes.push(7);
        put_u2(&mut self.bytes, name_index);
        let index = self.take(1);
        self.classes.insert(name.to_string(), index);
        index
    }

    fn literal(&mut self, value: Literal) -> u16 {
        match value {
            Literal::Int(value) => {
                self.bytes.push(3);
                self.bytes.extend_from_slice(&value.to_be_bytes());
                self.take(1)
            }
            Literal::Float(value) => {
                self.bytes.push(4);
                self.bytes.extend_from_slice(&value.to_bits().to_be_bytes());
                self.take(1)
            }
            Literal::Long(value) => {
                self.bytes.push(5);
                self.bytes.extend_from_slice(&value.to_be_bytes());
                self.take(2)
            }
            Literal::Double(value) => {
                self.bytes.push(6);
                self.bytes.extend_from_slice(&value.to_bits().to_be_bytes());
                self.take(2)
            }
            Literal::Str(value) => {
                let utf8 = self.utf8(value);
                self.bytes.push(8);
                put_u2(&mut self.bytes, utf8);
                self.take(1)
            }
        }
    }

    fn take(&mut self, slots: u16) -> u16 {
        let index = self.next_index;
        self.next_index += slots;
        index
    }
}

fn put_u2(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}

/// Writes `bytes` as `<root>/<internal_name>.class`.
pub fn write_class(root: &Path, internal_name: &str, bytes: &[u8]) -> PathBuf {
    let path = root.join(format!("{internal_name}.class"));
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create class dir");
    }
    fs::write(&path, bytes).expect("write class file");
    path
}

/// Writes a zip archive holding `entries` in order.
pub fn write_archive(path: &Path, entries: &[(&str, Vec<u8>)]) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create archive dir");
    }
    let file = fs::File::create(path).expect("create archive");
    let mut writer = ZipWriter::new(file);
    for (name, bytes) in entries {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .expect("start entry");
        writer.write_all(bytes).expect("write entry");
    }
    writer.finish().expect("finish archive");
    path.to_path_buf()
}

pub fn multi_release_manifest() -> Vec<u8> {
    b"Manifest-Version: 1.0\r\nCreated-By: tests\r\nMulti-Release: true\r\n\r\n".to_vec()
}

pub fn plain_manifest() -> Vec<u8> {
    b"Manifest-Version: 1.0\r\n\r\n".to_vec()
}
