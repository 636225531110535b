use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Most array dimensions a descriptor may declare.
pub const MAX_ARRAY_DIMENSIONS: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed descriptor '{descriptor}': {reason}")]
pub struct DescriptorError {
    pub descriptor: String,
    pub reason: String,
}

impl DescriptorError {
    fn new(descriptor: &str, reason: impl Into<String>) -> Self {
        Self {
            descriptor: descriptor.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveType {
    pub fn from_code(code: u8) -> Option<Self> {
        let primitive = match code {
            b'Z' => Self::Boolean,
            b'B' => Self::Byte,
            b'C' => Self::Char,
            b'S' => Self::Short,
            b'I' => Self::Int,
            b'J' => Self::Long,
            b'F' => Self::Float,
            b'D' => Self::Double,
            _ => return None,
        };
        Some(primitive)
    }

    pub fn code(self) -> char {
        match self {
            Self::Boolean => 'Z',
            Self::Byte => 'B',
            Self::Char => 'C',
            Self::Short => 'S',
            Self::Int => 'I',
            Self::Long => 'J',
            Self::Float => 'F',
            Self::Double => 'D',
        }
    }
}

/// A parsed field descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    Primitive(PrimitiveType),
    /// Internal (slash-separated) class name.
    Object(String),
    Array(Box<FieldType>),
}

impl FieldType {
    pub fn parse(descriptor: &str) -> Result<Self, DescriptorError> {
        let mut parser = DescriptorParser::new(descriptor);
        let ty = parser.parse_type()?;
        if parser.remaining() != 0 {
            return Err(DescriptorError::new(descriptor, "trailing characters"));
        }
        Ok(ty)
    }

    /// The raw descriptor fragment, e.g. `[Ljava/lang/String;`.
    pub fn descriptor(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(primitive) => write!(f, "{}", primitive.code()),
            Self::Object(name) => write!(f, "L{};", name),
            Self::Array(element) => write!(f, "[{}", element),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReturnType {
    Void,
    Value(FieldType),
}

impl fmt::Display for ReturnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Void => f.write_str("V"),
            Self::Value(ty) => ty.fmt(f),
        }
    }
}

/// A parsed method descriptor. Equality is structural.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodDescriptor {
    pub parameters: Vec<FieldType>,
    pub return_type: ReturnType,
}

impl MethodDescriptor {
    pub fn parse(descriptor: &str) -> Result<Self, DescriptorError> {
        let mut parser = DescriptorParser::new(descriptor);
        parser.expect(b'(')?;
        let mut parameters = Vec::new();
        while !parser.peek(b')')? {
            parameters.push(parser.parse_type()?);
        }
        parser.expect(b')')?;
        let return_type = if parser.peek(b'V')? {
            parser.advance(1);
            ReturnType::Void
        } else {
            ReturnType::Value(parser.parse_type()?)
        };

        if parser.remaining() != 0 {
            return Err(DescriptorError::new(descriptor, "trailing characters"));
        }

        Ok(Self {
            parameters,
            return_type,
        })
    }

    /// Concatenated raw parameter fragments in declaration order.
    pub fn parameter_descriptors(&self) -> String {
        self.parameters.iter().map(FieldType::descriptor).collect()
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for parameter in &self.parameters {
            parameter.fmt(f)?;
        }
        write!(f, "){}", self.return_type)
    }
}

impl FromStr for MethodDescriptor {
    type Err = DescriptorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

struct DescriptorParser<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> DescriptorParser<'a> {
    fn new(descriptor: &'a str) -> Self {
        Self {
            source: descriptor,
            bytes: descriptor.as_bytes(),
            pos: 0,
        }
    }

    fn error(&self, reason: impl Into<String>) -> DescriptorError {
        DescriptorError::new(self.source, reason)
    }

    fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.pos)
    }

    fn expect(&mut self, byte: u8) -> Result<(), DescriptorError> {
        if self.remaining() < 1 || self.bytes[self.pos] != byte {
            return Err(self.error(format!("expected '{}'", byte as char)));
        }
        self.pos += 1;
        Ok(())
    }

    fn advance(&mut self, count: usize) {
        self.pos += count;
    }

    fn peek(&self, byte: u8) -> Result<bool, DescriptorError> {
        if self.remaining() < 1 {
            return Err(self.error("unexpected end"));
        }
        Ok(self.bytes[self.pos] == byte)
    }

    fn parse_type(&mut self) -> Result<FieldType, DescriptorError> {
        let mut dimensions = 0;
        while self.remaining() > 0 && self.bytes[self.pos] == b'[' {
            dimensions += 1;
            if dimensions > MAX_ARRAY_DIMENSIONS {
                return Err(self.error(format!(
                    "more than {} array dimensions",
                    MAX_ARRAY_DIMENSIONS
                )));
            }
            self.pos += 1;
        }
        if self.remaining() == 0 {
            return Err(self.error("unexpected end"));
        }

        let start = self.bytes[self.pos];
        let mut ty = match PrimitiveType::from_code(start) {
            Some(primitive) => {
                self.pos += 1;
                FieldType::Primitive(primitive)
            }
            None if start == b'L' => self.parse_reference_type()?,
            None => return Err(self.error(format!("unexpected tag '{}'", start as char))),
        };
        for _ in 0..dimensions {
            ty = FieldType::Array(Box::new(ty));
        }
        Ok(ty)
    }

    fn parse_reference_type(&mut self) -> Result<FieldType, DescriptorError> {
        self.expect(b'L')?;
        let start = self.pos;
        while self.pos < self.bytes.len() && self.bytes[self.pos] != b';' {
            self.pos += 1;
        }
        if self.pos >= self.bytes.len() {
            return Err(self.error("unterminated reference"));
        }
        if self.pos == start {
            return Err(self.error("empty class name"));
        }
        // ';' is ASCII, so both ends are char boundaries.
        let name = &self.source[start..self.pos];
        self.pos += 1;
        Ok(FieldType::Object(name.to_string()))
    }
}
