use std::collections::HashMap;

use crate::{
    constant_pool::{
        ClassInfo, ConstantPool, CpInfo, MethodHandleInfo, MethodTypeInfo, NameAndTypeInfo,
        RefInfo,
    },
    ByteVector, ClassVersion, ClassWriterError, Result,
};

/// A constant value that can be stored in a `ConstantValue` attribute, an annotation or an
/// `ldc` instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Boolean(bool),
    Byte(i8),
    Char(u16),
    Short(i16),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    String(String),
    /// A class literal, given by its internal name.
    Class(String),
    /// A method type, given by its descriptor.
    MethodType(String),
}

impl From<i32> for Constant {
    fn from(value: i32) -> Self {
        Constant::Integer(value)
    }
}

impl From<i64> for Constant {
    fn from(value: i64) -> Self {
        Constant::Long(value)
    }
}

impl From<f32> for Constant {
    fn from(value: f32) -> Self {
        Constant::Float(value)
    }
}

impl From<f64> for Constant {
    fn from(value: f64) -> Self {
        Constant::Double(value)
    }
}

impl From<&str> for Constant {
    fn from(value: &str) -> Self {
        Constant::String(value.to_owned())
    }
}

/// A constant pool entry added to a [`SymbolTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol {
    pub tag: u8,
    pub index: u16,
}

/// Values are compared by content; floating point values by bit pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum SymbolKey {
    Utf8(String),
    Integer(i32),
    Float(u32),
    Long(i64),
    Double(u64),
    Class(String),
    String(String),
    NameAndType(String, String),
    FieldRef(String, String, String),
    MethodRef(String, String, String),
    InterfaceMethodRef(String, String, String),
    MethodHandle(u8, String, String, String, bool),
    MethodType(String),
    Module(String),
    Package(String),
}

/// The constant pool of the class being written, together with the class version.
///
/// Adding a value that is already present returns the existing index, so every distinct
/// value is stored once. Indices are handed out in insertion order and never change.
#[derive(Debug, Default)]
pub struct SymbolTable {
    version: ClassVersion,
    class_name: Option<String>,
    constant_pool: ConstantPool,
    entries: HashMap<SymbolKey, u16>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_version(version: ClassVersion) -> Self {
        Self {
            version,
            ..Self::default()
        }
    }

    pub fn major_version(&self) -> u16 {
        self.version.major
    }

    pub fn version(&self) -> ClassVersion {
        self.version
    }

    pub fn class_name(&self) -> Option<&str> {
        self.class_name.as_deref()
    }

    /// Sets the class version and name, and returns the index of the class constant.
    pub fn set_version_and_class_name(&mut self, version: ClassVersion, class_name: &str) -> u16 {
        self.version = version;
        self.class_name = Some(class_name.to_owned());
        self.add_class(class_name)
    }

    pub fn constant_pool(&self) -> &ConstantPool {
        &self.constant_pool
    }

    /// The `constant_pool_count` item of the class file.
    pub fn constant_pool_count(&self) -> usize {
        self.constant_pool.count()
    }

    pub fn get(&self, index: u16) -> Option<&CpInfo> {
        self.constant_pool.get(index)
    }

    pub fn utf8(&self, index: u16) -> Option<&str> {
        match self.get(index)? {
            CpInfo::Utf8(s) => Some(s),
            _ => None,
        }
    }

    /// Writes `constant_pool_count` followed by every entry.
    pub fn put_constant_pool(&self, output: &mut ByteVector) -> Result<()> {
        let count = self.constant_pool_count();
        if count > u16::MAX as usize {
            log::warn!("Constant pool has {} slots", count);
            return Err(ClassWriterError::ConstantPoolTooLarge(count));
        }

        output.put_u16(count as u16);
        self.constant_pool.put(output)
    }

    /// Number of bytes written by [`SymbolTable::put_constant_pool`].
    pub fn constant_pool_size(&self) -> usize {
        2 + self.constant_pool.size()
    }

    pub fn add_utf8(&mut self, value: &str) -> u16 {
        if let Some(index) = self.entries.get(&SymbolKey::Utf8(value.to_owned())) {
            return *index;
        }
        self.add_entry(SymbolKey::Utf8(value.to_owned()), CpInfo::Utf8(value.to_owned()))
    }

    pub fn add_integer(&mut self, value: i32) -> u16 {
        self.find_or_add(SymbolKey::Integer(value), |_| CpInfo::Integer(value))
    }

    pub fn add_float(&mut self, value: f32) -> u16 {
        self.find_or_add(SymbolKey::Float(value.to_bits()), |_| CpInfo::Float(value))
    }

    pub fn add_long(&mut self, value: i64) -> u16 {
        self.find_or_add(SymbolKey::Long(value), |_| CpInfo::Long(value))
    }

    pub fn add_double(&mut self, value: f64) -> u16 {
        self.find_or_add(SymbolKey::Double(value.to_bits()), |_| CpInfo::Double(value))
    }

    pub fn add_string(&mut self, value: &str) -> u16 {
        self.find_or_add(SymbolKey::String(value.to_owned()), |table| {
            CpInfo::String {
                string_index: table.add_utf8(value),
            }
        })
    }

    /// Adds a class constant for the given internal name.
    pub fn add_class(&mut self, internal_name: &str) -> u16 {
        self.find_or_add(SymbolKey::Class(internal_name.to_owned()), |table| {
            CpInfo::Class(ClassInfo {
                name_index: table.add_utf8(internal_name),
            })
        })
    }

    pub fn add_name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
        let key = SymbolKey::NameAndType(name.to_owned(), descriptor.to_owned());
        self.find_or_add(key, |table| {
            CpInfo::NameAndType(NameAndTypeInfo {
                name_index: table.add_utf8(name),
                descriptor_index: table.add_utf8(descriptor),
            })
        })
    }

    pub fn add_field_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> u16 {
        let key = SymbolKey::FieldRef(owner.to_owned(), name.to_owned(), descriptor.to_owned());
        self.find_or_add(key, |table| {
            CpInfo::FieldRef(table.ref_info(owner, name, descriptor))
        })
    }

    pub fn add_method_ref(
        &mut self,
        owner: &str,
        name: &str,
        descriptor: &str,
        is_interface: bool,
    ) -> u16 {
        let (o, n, d) = (owner.to_owned(), name.to_owned(), descriptor.to_owned());
        if is_interface {
            self.find_or_add(SymbolKey::InterfaceMethodRef(o, n, d), |table| {
                CpInfo::InterfaceMethodRef(table.ref_info(owner, name, descriptor))
            })
        } else {
            self.find_or_add(SymbolKey::MethodRef(o, n, d), |table| {
                CpInfo::MethodRef(table.ref_info(owner, name, descriptor))
            })
        }
    }

    /// Adds a method handle; `reference_kind` is one of the `REF_*` values (1 to 9).
    pub fn add_method_handle(
        &mut self,
        reference_kind: u8,
        owner: &str,
        name: &str,
        descriptor: &str,
        is_interface: bool,
    ) -> u16 {
        let key = SymbolKey::MethodHandle(
            reference_kind,
            owner.to_owned(),
            name.to_owned(),
            descriptor.to_owned(),
            is_interface,
        );
        self.find_or_add(key, |table| {
            // REF_getField ..= REF_putStatic
            let reference_index = if reference_kind <= 4 {
                table.add_field_ref(owner, name, descriptor)
            } else {
                table.add_method_ref(owner, name, descriptor, is_interface)
            };
            CpInfo::MethodHandle(MethodHandleInfo {
                reference_kind,
                reference_index,
            })
        })
    }

    pub fn add_method_type(&mut self, descriptor: &str) -> u16 {
        self.find_or_add(SymbolKey::MethodType(descriptor.to_owned()), |table| {
            CpInfo::MethodType(MethodTypeInfo {
                descriptor_index: table.add_utf8(descriptor),
            })
        })
    }

    pub fn add_module(&mut self, name: &str) -> u16 {
        self.find_or_add(SymbolKey::Module(name.to_owned()), |table| CpInfo::Module {
            name_index: table.add_utf8(name),
        })
    }

    pub fn add_package(&mut self, name: &str) -> u16 {
        self.find_or_add(SymbolKey::Package(name.to_owned()), |table| CpInfo::Package {
            name_index: table.add_utf8(name),
        })
    }

    /// Adds a constant, choosing the constant pool tag from the kind of `value`.
    ///
    /// `Boolean`, `Byte`, `Char` and `Short` are stored as `CONSTANT_Integer`.
    pub fn add_constant(&mut self, value: &Constant) -> Symbol {
        use crate::constant_pool::*;

        let (tag, index) = match value {
            Constant::Boolean(b) => (CONSTANT_INTEGER_TAG, self.add_integer(*b as i32)),
            Constant::Byte(b) => (CONSTANT_INTEGER_TAG, self.add_integer(*b as i32)),
            Constant::Char(c) => (CONSTANT_INTEGER_TAG, self.add_integer(*c as i32)),
            Constant::Short(s) => (CONSTANT_INTEGER_TAG, self.add_integer(*s as i32)),
            Constant::Integer(i) => (CONSTANT_INTEGER_TAG, self.add_integer(*i)),
            Constant::Float(f) => (CONSTANT_FLOAT_TAG, self.add_float(*f)),
            Constant::Long(l) => (CONSTANT_LONG_TAG, self.add_long(*l)),
            Constant::Double(d) => (CONSTANT_DOUBLE_TAG, self.add_double(*d)),
            Constant::String(s) => (CONSTANT_STRING_TAG, self.add_string(s)),
            Constant::Class(name) => (CONSTANT_CLASS_TAG, self.add_class(name)),
            Constant::MethodType(descriptor) => {
                (CONSTANT_METHOD_TYPE_TAG, self.add_method_type(descriptor))
            }
        };

        Symbol { tag, index }
    }

    fn ref_info(&mut self, owner: &str, name: &str, descriptor: &str) -> RefInfo {
        RefInfo {
            class_index: self.add_class(owner),
            name_and_type_index: self.add_name_and_type(name, descriptor),
        }
    }

    fn find_or_add(&mut self, key: SymbolKey, cp_info: impl FnOnce(&mut Self) -> CpInfo) -> u16 {
        if let Some(index) = self.entries.get(&key) {
            return *index;
        }
        // Referenced entries are added first, so they get the lower indices.
        let cp_info = cp_info(self);
        self.add_entry(key, cp_info)
    }

    fn add_entry(&mut self, key: SymbolKey, cp_info: CpInfo) -> u16 {
        log::trace!("cp#{} = {:?}", self.constant_pool.count(), cp_info);
        let slot = self.constant_pool.push(cp_info);
        let index = u16::try_from(slot).unwrap_or_else(|_| {
            log::warn!("Constant pool slot {} is past the last usable index", slot);
            u16::MAX
        });
        self.entries.insert(key, index);
        index
    }
}

#[cfg(test)]
mod add_utf8_tests {
    use super::*;

    #[test]
    fn it_should_assign_indices_from_one_in_insertion_order() {
        let mut table = SymbolTable::new();

        assert_eq!(1, table.add_utf8("a"));
        assert_eq!(2, table.add_utf8("b"));
        assert_eq!(3, table.add_utf8("c"));
    }

    #[test]
    fn it_should_reuse_the_index_of_an_equal_value() {
        let mut table = SymbolTable::new();
        let first = table.add_utf8("ConstantValue");
        table.add_utf8("other");

        assert_eq!(first, table.add_utf8("ConstantValue"));
        assert_eq!(3, table.constant_pool_count());
    }

    #[test]
    fn it_should_be_able_to_read_back_a_value() {
        let mut table = SymbolTable::new();
        let index = table.add_utf8("Signature");

        assert_eq!(Some("Signature"), table.utf8(index));
        assert_eq!(None, table.utf8(0));
    }
}

#[cfg(test)]
mod add_constant_tests {
    use crate::constant_pool::*;

    use super::*;

    #[test]
    fn it_should_store_small_integral_kinds_as_integers() {
        let mut table = SymbolTable::new();
        let int = table.add_constant(&Constant::Integer(1));

        assert_eq!(int, table.add_constant(&Constant::Boolean(true)));
        assert_eq!(int, table.add_constant(&Constant::Byte(1)));
        assert_eq!(int, table.add_constant(&Constant::Char(1)));
        assert_eq!(int, table.add_constant(&Constant::Short(1)));
        assert_eq!(CONSTANT_INTEGER_TAG, int.tag);
    }

    #[test]
    fn it_should_keep_an_integer_and_a_float_with_the_same_bits_apart() {
        let mut table = SymbolTable::new();
        let int = table.add_constant(&Constant::Integer(0));
        let float = table.add_constant(&Constant::Float(0.0));

        assert_ne!(int.index, float.index);
        assert_eq!(CONSTANT_FLOAT_TAG, float.tag);
    }

    #[test]
    fn it_should_deduplicate_nan_by_bit_pattern() {
        let mut table = SymbolTable::new();

        assert_eq!(table.add_double(f64::NAN), table.add_double(f64::NAN));
        assert_ne!(table.add_double(0.0), table.add_double(-0.0));
    }

    #[test]
    fn it_should_add_the_utf8_of_a_string_first() {
        let mut table = SymbolTable::new();
        let string = table.add_constant(&Constant::from("hello"));

        assert_eq!(2, string.index);
        assert_eq!(CpInfo::Utf8("hello".into()), table.constant_pool()[1]);
        assert_eq!(CpInfo::String { string_index: 1 }, table.constant_pool()[2]);
    }

    #[test]
    fn it_should_take_two_slots_for_a_long() {
        let mut table = SymbolTable::new();

        assert_eq!(1, table.add_constant(&Constant::Long(5)).index);
        assert_eq!(3, table.add_utf8("x"));
    }
}


#[cfg(test)]
mod put_constant_pool_tests {
    use super::*;

    #[test]
    fn it_should_prefix_the_entries_with_their_count() {
        let mut table = SymbolTable::new();
        table.add_class("A");

        let mut output = ByteVector::new();
        table.put_constant_pool(&mut output).unwrap();

        assert_eq!(&[0, 3, 1, 0, 1, b'A', 7, 0, 1], output.as_slice());
        assert_eq!(output.len(), table.constant_pool_size());
    }

    #[test]
    fn it_should_fail_if_there_are_too_many_entries() {
        let mut table = SymbolTable::new();
        (0..=u16::MAX as i32 / 2).for_each(|i| {
            table.add_long(i as i64);
        });

        assert!(matches!(
            table.put_constant_pool(&mut ByteVector::new()),
            Err(ClassWriterError::ConstantPoolTooLarge(_))
        ));
    }

    #[test]
    fn it_should_never_hand_out_index_zero_past_the_last_slot() {
        let mut table = SymbolTable::new();
        // 65534 slots, indices 1 to 65533
        (0..0x7FFF).for_each(|i| {
            table.add_long(i as i64);
        });

        assert_eq!(u16::MAX, table.add_utf8("last"));
        assert_eq!(u16::MAX, table.add_utf8("overflow"));
        assert_ne!(0, table.add_utf8("overflow"));
    }
}
