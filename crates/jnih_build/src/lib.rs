// jnih_build - Class file scanning, classpath resolution and JNI header generation
pub mod classpath;
pub mod config;
pub mod descriptor;
pub mod emit;
pub mod error;
pub mod generator;
pub mod mangle;
pub mod metadata;
pub mod names;

pub use classpath::{ClassPath, ClassPathBuilder, ClassSource, ResolveError, SearchRoot};
pub use config::{ConfigError, GeneratorConfig, OutputTarget};
pub use descriptor::{DescriptorError, FieldType, MethodDescriptor, PrimitiveType, ReturnType};
pub use emit::{render_many, render_one, write_if_changed, WriteOutcome};
pub use error::JnihError;
pub use generator::{ClassFailure, ClassRequest, GenerationReport, HeaderGenerator};
pub use mangle::{ClassHierarchy, NativeType, WellKnownHierarchy};
pub use metadata::{parse_class, ClassMetadata, ClassParseError, ConstantValue, NativeMethod};
pub use names::{NameError, QualifiedClassName};
