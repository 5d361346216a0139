// https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-4.html

mod access_flags;
mod annotation;
mod attributes;
mod byte_vector;
mod class_writer;
pub mod constant_pool;
mod error;
mod field_writer;
mod method_writer;
mod symbol_table;
mod type_reference;
mod version;

pub use access_flags::AccessFlags;
pub use annotation::{AnnotationChain, AnnotationValue, AnnotationVisitor};
pub use attributes::{Attribute, AttributeChain, RawAttribute};
pub use byte_vector::ByteVector;
pub use class_writer::ClassWriter;
pub use constant_pool::ConstantPool;
pub use error::ClassWriterError;
pub use field_writer::{FieldVisitor, FieldWriter};
pub use method_writer::{MethodVisitor, MethodWriter};
pub use symbol_table::{Constant, Symbol, SymbolTable};
pub use type_reference::{TargetType, TypePath, TypePathStep, TypeReference};
pub use version::ClassVersion;

pub type Result<T, E = ClassWriterError> = std::result::Result<T, E>;
