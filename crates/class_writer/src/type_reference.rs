use std::str::FromStr;

use crate::{ByteVector, ClassWriterError};

/// The `target_type` of a type annotation.
///
/// `LOCAL_VARIABLE` and `RESOURCE_VARIABLE` targets are not listed: their `target_info`
/// refers to bytecode ranges, which this crate does not produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TargetType {
    ClassTypeParameter = 0x00,
    MethodTypeParameter = 0x01,
    ClassExtends = 0x10,
    ClassTypeParameterBound = 0x11,
    MethodTypeParameterBound = 0x12,
    Field = 0x13,
    MethodReturn = 0x14,
    MethodReceiver = 0x15,
    MethodFormalParameter = 0x16,
    Throws = 0x17,
    ExceptionParameter = 0x42,
    Instanceof = 0x43,
    New = 0x44,
    ConstructorReference = 0x45,
    MethodReference = 0x46,
    Cast = 0x47,
    ConstructorInvocationTypeArgument = 0x48,
    MethodInvocationTypeArgument = 0x49,
    ConstructorReferenceTypeArgument = 0x4A,
    MethodReferenceTypeArgument = 0x4B,
}

/// The type (or part of a type) that a type annotation applies to, packed as in
/// `target_type << 24 | target_info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeReference {
    target_type: TargetType,
    value: u32,
}

impl TypeReference {
    /// A reference with an empty `target_info`: `Field`, `MethodReturn` or `MethodReceiver`.
    pub fn new(target_type: TargetType) -> Self {
        Self::packed(target_type, 0)
    }

    /// `ClassTypeParameter` or `MethodTypeParameter`.
    pub fn type_parameter(target_type: TargetType, parameter_index: u8) -> Self {
        Self::packed(target_type, (parameter_index as u32) << 16)
    }

    /// `ClassTypeParameterBound` or `MethodTypeParameterBound`.
    pub fn type_parameter_bound(
        target_type: TargetType,
        parameter_index: u8,
        bound_index: u8,
    ) -> Self {
        Self::packed(
            target_type,
            (parameter_index as u32) << 16 | (bound_index as u32) << 8,
        )
    }

    /// The super class (`0xFFFF`) or an implemented interface of a class.
    pub fn super_type(interface_index: u16) -> Self {
        Self::packed(TargetType::ClassExtends, (interface_index as u32) << 8)
    }

    pub fn formal_parameter(parameter_index: u8) -> Self {
        Self::packed(
            TargetType::MethodFormalParameter,
            (parameter_index as u32) << 16,
        )
    }

    pub fn exceptions(exception_index: u16) -> Self {
        Self::packed(TargetType::Throws, (exception_index as u32) << 8)
    }

    pub fn try_catch(try_catch_block_index: u16) -> Self {
        Self::packed(
            TargetType::ExceptionParameter,
            (try_catch_block_index as u32) << 8,
        )
    }

    /// `Instanceof`, `New`, `ConstructorReference` or `MethodReference` at a bytecode offset.
    pub fn offset(target_type: TargetType, offset: u16) -> Self {
        Self::packed(target_type, (offset as u32) << 8)
    }

    /// `Cast` or one of the `*TypeArgument` targets.
    pub fn type_argument(target_type: TargetType, offset: u16, argument_index: u8) -> Self {
        Self::packed(
            target_type,
            (offset as u32) << 8 | argument_index as u32,
        )
    }

    pub fn target_type(&self) -> TargetType {
        self.target_type
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    fn packed(target_type: TargetType, target_info: u32) -> Self {
        Self {
            target_type,
            value: (target_type as u32) << 24 | target_info,
        }
    }

    /// Puts `target_type` followed by `target_info`.
    pub(crate) fn put_target(&self, output: &mut ByteVector) {
        use TargetType::*;

        match self.target_type {
            ClassTypeParameter | MethodTypeParameter | MethodFormalParameter => {
                output.put_u16((self.value >> 16) as u16);
            }
            Field | MethodReturn | MethodReceiver => {
                output.put_u8(self.target_type as u8);
            }
            Cast
            | ConstructorInvocationTypeArgument
            | MethodInvocationTypeArgument
            | ConstructorReferenceTypeArgument
            | MethodReferenceTypeArgument => {
                output.put_u32(self.value);
            }
            ClassExtends | ClassTypeParameterBound | MethodTypeParameterBound | Throws
            | ExceptionParameter | Instanceof | New | ConstructorReference | MethodReference => {
                output.put_12(
                    self.target_type as u8,
                    ((self.value & 0x00FF_FF00) >> 8) as u16,
                );
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypePathStep {
    ArrayElement,
    InnerType,
    WildcardBound,
    TypeArgument(u8),
}

impl TypePathStep {
    fn kind_and_argument(self) -> (u8, u8) {
        match self {
            TypePathStep::ArrayElement => (0, 0),
            TypePathStep::InnerType => (1, 0),
            TypePathStep::WildcardBound => (2, 0),
            TypePathStep::TypeArgument(index) => (3, index),
        }
    }
}

/// The path to the annotated part of a type, stored in its `type_path` encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypePath {
    bytes: Vec<u8>,
}

impl TypePath {
    /// At most 255 steps are kept.
    pub fn new(steps: &[TypePathStep]) -> Self {
        let steps = &steps[..steps.len().min(u8::MAX as usize)];
        let mut bytes = Vec::with_capacity(1 + 2 * steps.len());
        bytes.push(steps.len() as u8);
        for step in steps {
            let (kind, argument) = step.kind_and_argument();
            bytes.push(kind);
            bytes.push(argument);
        }
        Self { bytes }
    }

    pub fn len(&self) -> usize {
        self.bytes[0] as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn steps(&self) -> impl Iterator<Item = TypePathStep> + '_ {
        self.bytes[1..].chunks(2).map(|step| match step[0] {
            0 => TypePathStep::ArrayElement,
            1 => TypePathStep::InnerType,
            2 => TypePathStep::WildcardBound,
            _ => TypePathStep::TypeArgument(step[1]),
        })
    }

    /// Puts `path`, or an empty path when there is none.
    pub(crate) fn put(path: Option<&TypePath>, output: &mut ByteVector) {
        match path {
            Some(path) => output.put_bytes(&path.bytes),
            None => output.put_u8(0),
        };
    }
}

/// Parses the textual form used by `javap`-like tools: `[` array element, `.` inner type,
/// `*` wildcard bound and `<n>;` type argument.
impl FromStr for TypePath {
    type Err = ClassWriterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ClassWriterError::InvalidTypePath(s.to_owned());

        let mut steps = Vec::new();
        let mut chars = s.chars().peekable();
        while let Some(c) = chars.next() {
            let step = match c {
                '[' => TypePathStep::ArrayElement,
                '.' => TypePathStep::InnerType,
                '*' => TypePathStep::WildcardBound,
                '0'..='9' => {
                    let mut index = c.to_digit(10).unwrap_or_default();
                    while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
                        index = index * 10 + digit;
                        if index > u8::MAX as u32 {
                            return Err(invalid());
                        }
                        chars.next();
                    }
                    if chars.next() != Some(';') {
                        return Err(invalid());
                    }
                    TypePathStep::TypeArgument(index as u8)
                }
                _ => return Err(invalid()),
            };
            steps.push(step);
        }

        if steps.len() > u8::MAX as usize {
            return Err(invalid());
        }
        Ok(TypePath::new(&steps))
    }
}
