//! Bounded single-pass class file scanner.
//!
//! Only the facts needed for header generation are decoded: this/super class
//! names, numeric `ConstantValue`s of static fields and the `ACC_NATIVE`
//! methods. Every attribute body (including `Code`) is skipped by length.

use super::model::{ClassMetadata, ConstantValue, NativeMethod};
use crate::descriptor::{DescriptorError, MethodDescriptor};
use crate::names::is_valid_method_name;
use thiserror::Error;

const MAGIC: u32 = 0xCAFE_BABE;
const MIN_MAJOR_VERSION: u16 = 45;
/// Java 25.
const MAX_MAJOR_VERSION: u16 = 69;

const ACC_STATIC: u16 = 0x0008;
const ACC_NATIVE: u16 = 0x0100;

const CONSTANT_VALUE_ATTRIBUTE: &str = "ConstantValue";

#[derive(Debug, Error)]
pub enum ClassParseError {
    #[error("unexpected end of class file")]
    UnexpectedEof,
    #[error("invalid class file magic header")]
    InvalidMagic,
    #[error("unsupported class file version {major}.{minor}")]
    UnsupportedVersion { major: u16, minor: u16 },
    #[error("unsupported constant pool tag {tag}")]
    UnsupportedConstant { tag: u8 },
    #[error("invalid constant pool index {index}")]
    InvalidConstantIndex { index: u16 },
    #[error("invalid modified UTF-8 in constant pool entry {index}")]
    InvalidUtf8 { index: u16 },
    #[error("illegal native method name '{name}'")]
    InvalidMethodName { name: String },
    #[error(transparent)]
    InvalidDescriptor(#[from] DescriptorError),
}

/// Extracts [`ClassMetadata`] from raw class file bytes.
pub fn parse_class(bytes: &[u8]) -> Result<ClassMetadata, ClassParseError> {
    let mut reader = ClassReader::new(bytes);
    reader.expect_magic()?;
    let minor = reader.read_u2()?;
    let major = reader.read_u2()?;
    if !(MIN_MAJOR_VERSION..=MAX_MAJOR_VERSION).contains(&major) {
        return Err(ClassParseError::UnsupportedVersion { major, minor });
    }
    let constant_pool = ConstantPool::parse(&mut reader)?;

    let _access_flags = reader.read_u2()?;
    let this_class = reader.read_u2()?;
    let super_class = reader.read_u2()?;

    let interfaces_count = reader.read_u2()?;
    reader.skip(interfaces_count as usize * 2)?;

    let mut metadata = ClassMetadata::new(
        constant_pool.class_name(this_class)?,
        match super_class {
            0 => None,
            index => Some(constant_pool.class_name(index)?.to_string()),
        },
    );

    let fields_count = reader.read_u2()?;
    for _ in 0..fields_count {
        let access_flags = reader.read_u2()?;
        let name_index = reader.read_u2()?;
        let _descriptor_index = reader.read_u2()?;
        let attributes_count = reader.read_u2()?;

        for _ in 0..attributes_count {
            let attribute_name_index = reader.read_u2()?;
            let length = reader.read_u4()? as usize;
            let body = reader.read_slice(length)?;

            if access_flags & ACC_STATIC == 0 || length != 2 {
                continue;
            }
            if constant_pool.utf8(attribute_name_index)? != CONSTANT_VALUE_ATTRIBUTE {
                continue;
            }
            let value_index = u16::from_be_bytes([body[0], body[1]]);
            if let Some(value) = constant_pool.numeric(value_index)? {
                metadata.add_constant(constant_pool.utf8(name_index)?, value);
            }
        }
    }

    let methods_count = reader.read_u2()?;
    for _ in 0..methods_count {
        let access_flags = reader.read_u2()?;
        let name_index = reader.read_u2()?;
        let descriptor_index = reader.read_u2()?;
        let attributes_count = reader.read_u2()?;

        if access_flags & ACC_NATIVE != 0 {
            let name = constant_pool.utf8(name_index)?;
            if !is_valid_method_name(name) || name.starts_with('<') {
                return Err(ClassParseError::InvalidMethodName {
                    name: name.to_string(),
                });
            }
            let descriptor = MethodDescriptor::parse(constant_pool.utf8(descriptor_index)?)?;
            metadata.add_native_method(NativeMethod {
                name: name.to_string(),
                descriptor,
                is_static: access_flags & ACC_STATIC != 0,
            });
        }

        skip_attributes(&mut reader, attributes_count)?;
    }

    let attributes_count = reader.read_u2()?;
    skip_attributes(&mut reader, attributes_count)?;

    Ok(metadata)
}

#[derive(Debug, Clone)]
enum Constant {
    Utf8(String),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class { name_index: u16 },
    Other,
    Unusable,
}

struct ConstantPool {
    entries: Vec<Constant>,
}

impl ConstantPool {
    fn parse(reader: &mut ClassReader<'_>) -> Result<Self, ClassParseError> {
        let count = reader.read_u2()? as usize;
        let mut entries = Vec::with_capacity(count);
        entries.push(Constant::Unusable); // index 0 unused

        let mut index = 1;
        while index < count {
            let tag = reader.read_u1()?;
            let entry = match tag {
                1 => {
                    let length = reader.read_u2()? as usize;
                    let bytes = reader.read_slice(length)?;
                    let value = decode_modified_utf8(bytes).ok_or(ClassParseError::InvalidUtf8 {
                        index: index as u16,
                    })?;
                    Constant::Utf8(value)
                }
                3 => Constant::Integer(reader.read_u4()? as i32),
                4 => Constant::Float(f32::from_bits(reader.read_u4()?)),
                5 | 6 => {
                    let high = reader.read_u4()? as u64;
                    let low = reader.read_u4()? as u64;
                    let bits = (high << 32) | low;
                    let entry = if tag == 5 {
                        Constant::Long(bits as i64)
                    } else {
                        Constant::Double(f64::from_bits(bits))
                    };
                    // Eight-byte constants occupy two slots.
                    entries.push(entry);
                    index += 1;
                    Constant::Unusable
                }
                7 => Constant::Class {
                    name_index: reader.read_u2()?,
                },
                8 | 16 | 19 | 20 => {
                    reader.skip(2)?;
                    Constant::Other
                }
                15 => {
                    reader.skip(3)?;
                    Constant::Other
                }
                9 | 10 | 11 | 12 | 17 | 18 => {
                    reader.skip(4)?;
                    Constant::Other
                }
                other => return Err(ClassParseError::UnsupportedConstant { tag: other }),
            };

            entries.push(entry);
            index += 1;
        }

        Ok(Self { entries })
    }

    fn get(&self, index: u16) -> Result<&Constant, ClassParseError> {
        self.entries
            .get(index as usize)
            .ok_or(ClassParseError::InvalidConstantIndex { index })
    }

    fn utf8(&self, index: u16) -> Result<&str, ClassParseError> {
        match self.get(index)? {
            Constant::Utf8(value) => Ok(value.as_str()),
            _ => Err(ClassParseError::InvalidConstantIndex { index }),
        }
    }

    fn class_name(&self, index: u16) -> Result<&str, ClassParseError> {
        match self.get(index)? {
            Constant::Class { name_index } => self.utf8(*name_index),
            _ => Err(ClassParseError::InvalidConstantIndex { index }),
        }
    }

    /// Numeric value at `index`; `None` for strings and other loadable kinds.
    fn numeric(&self, index: u16) -> Result<Option<ConstantValue>, ClassParseError> {
        let value = match self.get(index)? {
            Constant::Integer(value) => Some(ConstantValue::Int(*value)),
            Constant::Long(value) => Some(ConstantValue::Long(*value)),
            Constant::Float(value) => Some(ConstantValue::Float(*value)),
            Constant::Double(value) => Some(ConstantValue::Double(*value)),
            Constant::Unusable => return Err(ClassParseError::InvalidConstantIndex { index }),
            _ => None,
        };
        Ok(value)
    }
}

struct ClassReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ClassReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn expect_magic(&mut self) -> Result<(), ClassParseError> {
        if self.read_u4()? != MAGIC {
            return Err(ClassParseError::InvalidMagic);
        }
        Ok(())
    }

    fn read_u1(&mut self) -> Result<u8, ClassParseError> {
        Ok(self.read_slice(1)?[0])
    }

    fn read_u2(&mut self) -> Result<u16, ClassParseError> {
        let bytes = self.read_slice(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    fn read_u4(&mut self) -> Result<u32, ClassParseError> {
        let bytes = self.read_slice(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_slice(&mut self, len: usize) -> Result<&'a [u8], ClassParseError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or(ClassParseError::UnexpectedEof)?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn skip(&mut self, len: usize) -> Result<(), ClassParseError> {
        self.read_slice(len).map(|_| ())
    }
}

fn skip_attributes(reader: &mut ClassReader<'_>, count: u16) -> Result<(), ClassParseError> {
    for _ in 0..count {
        reader.read_u2()?; // attribute_name_index
        let length = reader.read_u4()? as usize;
        reader.skip(length)?;
    }
    Ok(())
}

/// Decodes the JVM's modified UTF-8 (two-byte NUL, surrogate pairs encoded
/// as separate three-byte sequences).
fn decode_modified_utf8(bytes: &[u8]) -> Option<String> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Some(text.to_string());
    }

    let mut units = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b0 = bytes[i] as u16;
        match bytes[i] {
            0x01..=0x7F => {
                units.push(b0);
                i += 1;
            }
            0xC0..=0xDF => {
                let b1 = continuation(bytes.get(i + 1))?;
                units.push(((b0 & 0x1F) << 6) | b1);
                i += 2;
            }
            0xE0..=0xEF => {
                let b1 = continuation(bytes.get(i + 1))?;
                let b2 = continuation(bytes.get(i + 2))?;
                units.push(((b0 & 0x0F) << 12) | (b1 << 6) | b2);
                i += 3;
            }
            _ => return None,
        }
    }
    String::from_utf16(&units).ok()
}

fn continuation(byte: Option<&u8>) -> Option<u16> {
    match byte {
        Some(b) if b & 0xC0 == 0x80 => Some((b & 0x3F) as u16),
        _ => None,
    }
}
