#![allow(dead_code)]

use std::{
    collections::HashMap,
    io::{self, Cursor, Read},
};

use byteorder::{BigEndian, ReadBytesExt};
use cafe_class_writer::ClassWriter;

type Endian = BigEndian;

#[derive(Debug)]
pub struct AttributeInfo {
    pub name: String,
    pub info: Vec<u8>,
}

#[derive(Debug)]
pub struct MemberInfo {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    pub attributes: Vec<AttributeInfo>,
}

impl MemberInfo {
    pub fn attribute(&self, name: &str) -> Option<&AttributeInfo> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn attribute_names(&self) -> Vec<&str> {
        self.attributes.iter().map(|a| a.name.as_str()).collect()
    }
}

/// Just enough of a class file to check what was written.
#[derive(Debug)]
pub struct ClassInfo {
    pub minor_version: u16,
    pub major_version: u16,
    pub constant_pool_count: u16,
    /// `CONSTANT_Utf8` values and `CONSTANT_Class` name indices, by constant pool index.
    pub utf8: HashMap<u16, String>,
    pub classes: HashMap<u16, u16>,
    pub access_flags: u16,
    pub this_class: u16,
    pub super_class: u16,
    pub interfaces: Vec<u16>,
    pub fields: Vec<MemberInfo>,
    pub methods: Vec<MemberInfo>,
    pub attributes: Vec<AttributeInfo>,
}

impl ClassInfo {
    pub fn utf8(&self, index: u16) -> &str {
        &self.utf8[&index]
    }

    pub fn class_name(&self, index: u16) -> &str {
        self.utf8(self.classes[&index])
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeInfo> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn attribute_names(&self) -> Vec<&str> {
        self.attributes.iter().map(|a| a.name.as_str()).collect()
    }
}

pub struct Reader<R> {
    r: R,
    utf8: HashMap<u16, String>,
}

impl<R: Read> Reader<R> {
    pub fn new(r: R) -> Self {
        Self {
            r,
            utf8: HashMap::new(),
        }
    }

    pub fn read(mut self) -> io::Result<ClassInfo> {
        assert_eq!(0xCAFE_BABE, self.read_u32()?);
        let minor_version = self.read_u16()?;
        let major_version = self.read_u16()?;

        let constant_pool_count = self.read_u16()?;
        let classes = self.read_constant_pool(constant_pool_count)?;

        let access_flags = self.read_u16()?;
        let this_class = self.read_u16()?;
        let super_class = self.read_u16()?;
        let interfaces_count = self.read_u16()?;
        let mut interfaces = vec![0u16; interfaces_count as usize];
        self.r.read_u16_into::<Endian>(&mut interfaces)?;

        let fields_count = self.read_u16()?;
        let fields = (0..fields_count)
            .map(|_| self.read_member())
            .collect::<io::Result<Vec<_>>>()?;
        let methods_count = self.read_u16()?;
        let methods = (0..methods_count)
            .map(|_| self.read_member())
            .collect::<io::Result<Vec<_>>>()?;
        let attributes = self.read_attributes()?;

        let mut rest = Vec::new();
        self.r.read_to_end(&mut rest)?;
        assert!(rest.is_empty(), "{} trailing bytes", rest.len());

        Ok(ClassInfo {
            minor_version,
            major_version,
            constant_pool_count,
            utf8: self.utf8,
            classes,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        })
    }

    fn read_constant_pool(&mut self, count: u16) -> io::Result<HashMap<u16, u16>> {
        let mut classes = HashMap::new();
        let mut index = 1;
        while index < count {
            match self.read_u8()? {
                1 => {
                    let length = self.read_u16()?;
                    let bytes = self.read_bytes(length as usize)?;
                    self.utf8
                        .insert(index, String::from_utf8_lossy(&bytes).into_owned());
                }
                7 => {
                    classes.insert(index, self.read_u16()?);
                }
                8 | 16 | 19 | 20 => {
                    self.read_u16()?;
                }
                15 => {
                    self.read_bytes(3)?;
                }
                3 | 4 | 9 | 10 | 11 | 12 | 17 | 18 => {
                    self.read_u32()?;
                }
                5 | 6 => {
                    self.read_bytes(8)?;
                    index += 1;
                }
                tag => panic!("Unknown constant pool tag {} at {}", tag, index),
            }
            index += 1;
        }
        Ok(classes)
    }

    fn read_member(&mut self) -> io::Result<MemberInfo> {
        let access_flags = self.read_u16()?;
        let name_index = self.read_u16()?;
        let descriptor_index = self.read_u16()?;
        let attributes = self.read_attributes()?;

        Ok(MemberInfo {
            access_flags,
            name: self.utf8[&name_index].clone(),
            descriptor: self.utf8[&descriptor_index].clone(),
            attributes,
        })
    }

    fn read_attributes(&mut self) -> io::Result<Vec<AttributeInfo>> {
        let attributes_count = self.read_u16()?;
        (0..attributes_count)
            .map(|_| -> io::Result<AttributeInfo> {
                let name_index = self.read_u16()?;
                let length = self.read_u32()?;
                Ok(AttributeInfo {
                    name: self.utf8[&name_index].clone(),
                    info: self.read_bytes(length as usize)?,
                })
            })
            .collect()
    }

    fn read_bytes(&mut self, length: usize) -> io::Result<Vec<u8>> {
        let mut bytes = vec![0; length];
        self.r.read_exact(&mut bytes)?;
        Ok(bytes)
    }

    fn read_u32(&mut self) -> io::Result<u32> {
        self.r.read_u32::<Endian>()
    }

    fn read_u16(&mut self) -> io::Result<u16> {
        self.r.read_u16::<Endian>()
    }

    fn read_u8(&mut self) -> io::Result<u8> {
        self.r.read_u8()
    }
}

/// Reads the `u2` at `offset`.
pub fn u2(bytes: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([bytes[offset], bytes[offset + 1]])
}

pub fn with_class_file(class: ClassWriter, f: impl FnOnce(ClassInfo)) {
    let bytes = class.to_bytes().unwrap();
    f(Reader::new(Cursor::new(bytes)).read().unwrap());
}
