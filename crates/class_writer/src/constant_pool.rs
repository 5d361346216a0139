use std::ops::Index;

use crate::{ByteVector, Result};

pub const CONSTANT_UTF8_TAG: u8 = 1;
pub const CONSTANT_INTEGER_TAG: u8 = 3;
pub const CONSTANT_FLOAT_TAG: u8 = 4;
pub const CONSTANT_LONG_TAG: u8 = 5;
pub const CONSTANT_DOUBLE_TAG: u8 = 6;
pub const CONSTANT_CLASS_TAG: u8 = 7;
pub const CONSTANT_STRING_TAG: u8 = 8;
pub const CONSTANT_FIELDREF_TAG: u8 = 9;
pub const CONSTANT_METHODREF_TAG: u8 = 10;
pub const CONSTANT_INTERFACE_METHODREF_TAG: u8 = 11;
pub const CONSTANT_NAME_AND_TYPE_TAG: u8 = 12;
pub const CONSTANT_METHOD_HANDLE_TAG: u8 = 15;
pub const CONSTANT_METHOD_TYPE_TAG: u8 = 16;
pub const CONSTANT_MODULE_TAG: u8 = 19;
pub const CONSTANT_PACKAGE_TAG: u8 = 20;

/// The entries of a constant pool, in index order.
///
/// Index 0 is never used; `Long` and `Double` entries are followed by an `Unusable` slot.
#[derive(Debug, Default)]
pub struct ConstantPool {
    cp_infos: Vec<CpInfo>,
}
impl ConstantPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// The `constant_pool_count` item: one more than the number of used slots.
    pub fn count(&self) -> usize {
        self.cp_infos.len() + 1
    }

    pub fn get(&self, index: u16) -> Option<&CpInfo> {
        if index == 0 {
            return None;
        }
        self.cp_infos.get(index as usize - 1)
    }

    /// Appends `cp_info` and returns the index it was given.
    pub(crate) fn push(&mut self, cp_info: CpInfo) -> usize {
        let index = self.count();
        let slot_size = cp_info.slot_size();
        self.cp_infos.push(cp_info);
        (1..slot_size).for_each(|_| self.cp_infos.push(CpInfo::Unusable));
        index
    }

    pub(crate) fn put(&self, output: &mut ByteVector) -> Result<()> {
        for cp_info in &self.cp_infos {
            cp_info.put(output)?;
        }
        Ok(())
    }

    /// Number of bytes written by [`ConstantPool::put`], `constant_pool_count` excluded.
    pub(crate) fn size(&self) -> usize {
        self.cp_infos.iter().map(CpInfo::size).sum()
    }
}
impl Index<u16> for ConstantPool {
    type Output = CpInfo;

    fn index(&self, index: u16) -> &Self::Output {
        &self.cp_infos[index as usize - 1]
    }
}
impl<'a> IntoIterator for &'a ConstantPool {
    type Item = &'a CpInfo;
    type IntoIter = std::slice::Iter<'a, CpInfo>;

    fn into_iter(self) -> Self::IntoIter {
        self.cp_infos.iter()
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum CpInfo {
    Utf8(String),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class(ClassInfo),
    String { string_index: u16 },
    FieldRef(RefInfo),
    MethodRef(RefInfo),
    InterfaceMethodRef(RefInfo),
    NameAndType(NameAndTypeInfo),
    MethodHandle(MethodHandleInfo),
    MethodType(MethodTypeInfo),
    Module { name_index: u16 },
    Package { name_index: u16 },
    Unusable,
}

impl CpInfo {
    pub fn tag(&self) -> Option<u8> {
        Some(match self {
            CpInfo::Utf8(_) => CONSTANT_UTF8_TAG,
            CpInfo::Integer(_) => CONSTANT_INTEGER_TAG,
            CpInfo::Float(_) => CONSTANT_FLOAT_TAG,
            CpInfo::Long(_) => CONSTANT_LONG_TAG,
            CpInfo::Double(_) => CONSTANT_DOUBLE_TAG,
            CpInfo::Class(_) => CONSTANT_CLASS_TAG,
            CpInfo::String { .. } => CONSTANT_STRING_TAG,
            CpInfo::FieldRef(_) => CONSTANT_FIELDREF_TAG,
            CpInfo::MethodRef(_) => CONSTANT_METHODREF_TAG,
            CpInfo::InterfaceMethodRef(_) => CONSTANT_INTERFACE_METHODREF_TAG,
            CpInfo::NameAndType(_) => CONSTANT_NAME_AND_TYPE_TAG,
            CpInfo::MethodHandle(_) => CONSTANT_METHOD_HANDLE_TAG,
            CpInfo::MethodType(_) => CONSTANT_METHOD_TYPE_TAG,
            CpInfo::Module { .. } => CONSTANT_MODULE_TAG,
            CpInfo::Package { .. } => CONSTANT_PACKAGE_TAG,
            CpInfo::Unusable => return None,
        })
    }

    fn slot_size(&self) -> usize {
        match self {
            CpInfo::Long(_) | CpInfo::Double(_) => 2,
            _ => 1,
        }
    }

    fn size(&self) -> usize {
        match self {
            CpInfo::Utf8(s) => 3 + crate::byte_vector::modified_utf8_len(s),
            CpInfo::Integer(_) | CpInfo::Float(_) => 5,
            CpInfo::Long(_) | CpInfo::Double(_) => 9,
            CpInfo::Class(_)
            | CpInfo::String { .. }
            | CpInfo::MethodType(_)
            | CpInfo::Module { .. }
            | CpInfo::Package { .. } => 3,
            CpInfo::FieldRef(_)
            | CpInfo::MethodRef(_)
            | CpInfo::InterfaceMethodRef(_)
            | CpInfo::NameAndType(_) => 5,
            CpInfo::MethodHandle(_) => 4,
            CpInfo::Unusable => 0,
        }
    }

    fn put(&self, output: &mut ByteVector) -> Result<()> {
        let Some(tag) = self.tag() else {
            return Ok(());
        };
        output.put_u8(tag);

        match self {
            CpInfo::Utf8(s) => {
                output.put_utf8(s)?;
            }
            CpInfo::Integer(value) => {
                output.put_u32(*value as u32);
            }
            CpInfo::Float(value) => {
                output.put_u32(value.to_bits());
            }
            CpInfo::Long(value) => {
                output.put_u64(*value as u64);
            }
            CpInfo::Double(value) => {
                output.put_u64(value.to_bits());
            }
            CpInfo::Class(ClassInfo { name_index })
            | CpInfo::Module { name_index }
            | CpInfo::Package { name_index } => {
                output.put_u16(*name_index);
            }
            CpInfo::String { string_index } => {
                output.put_u16(*string_index);
            }
            CpInfo::FieldRef(ref_info)
            | CpInfo::MethodRef(ref_info)
            | CpInfo::InterfaceMethodRef(ref_info) => {
                output
                    .put_u16(ref_info.class_index)
                    .put_u16(ref_info.name_and_type_index);
            }
            CpInfo::NameAndType(NameAndTypeInfo {
                name_index,
                descriptor_index,
            }) => {
                output.put_u16(*name_index).put_u16(*descriptor_index);
            }
            CpInfo::MethodHandle(MethodHandleInfo {
                reference_kind,
                reference_index,
            }) => {
                output.put_12(*reference_kind, *reference_index);
            }
            CpInfo::MethodType(MethodTypeInfo { descriptor_index }) => {
                output.put_u16(*descriptor_index);
            }
            CpInfo::Unusable => {}
        }

        Ok(())
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct RefInfo {
    pub class_index: u16,
    pub name_and_type_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct ClassInfo {
    pub name_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct NameAndTypeInfo {
    pub name_index: u16,
    pub descriptor_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct MethodHandleInfo {
    pub reference_kind: u8,
    pub reference_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct MethodTypeInfo {
    pub descriptor_index: u16,
}
