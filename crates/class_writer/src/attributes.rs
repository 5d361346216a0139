use std::fmt;

use crate::{annotation::AnnotationChain, AccessFlags, ByteVector, SymbolTable};

/// A non-standard attribute attached to a class, field or method.
///
/// `write` is called once when the structure is sized and once when it is emitted; both
/// calls must produce the same bytes.
pub trait Attribute: fmt::Debug {
    fn name(&self) -> &str;

    /// Writes the `info` bytes, without the name index and length.
    fn write(&self, symbols: &mut SymbolTable, output: &mut ByteVector);
}

/// An attribute with fixed, opaque contents.
#[derive(Clone, PartialEq, Eq)]
pub struct RawAttribute {
    pub name: String,
    pub info: Vec<u8>,
}
impl RawAttribute {
    pub fn new(name: impl Into<String>, info: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            info: info.into(),
        }
    }
}
impl fmt::Debug for RawAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawAttribute")
            .field("name", &self.name)
            .field("info", &format!("({} bytes)", self.info.len()))
            .finish()
    }
}
impl Attribute for RawAttribute {
    fn name(&self) -> &str {
        &self.name
    }

    fn write(&self, _symbols: &mut SymbolTable, output: &mut ByteVector) {
        output.put_bytes(&self.info);
    }
}

#[derive(Debug)]
enum AttributeNode {
    Single(Box<dyn Attribute>),
    /// Several attributes linked as one node; each is still emitted as its own
    /// `attribute_info`.
    Group(Vec<Box<dyn Attribute>>),
}
impl AttributeNode {
    fn attributes(&self) -> &[Box<dyn Attribute>] {
        match self {
            AttributeNode::Single(attribute) => std::slice::from_ref(attribute),
            AttributeNode::Group(attributes) => attributes,
        }
    }
}

#[derive(Debug)]
struct Link {
    node: AttributeNode,
    next: Option<Box<Link>>,
}

/// The custom attributes of a structure.
///
/// Attributes are linked in front of the previously visited ones, so they are emitted in
/// reverse order of visit.
#[derive(Debug, Default)]
pub struct AttributeChain {
    first: Option<Box<Link>>,
}

impl AttributeChain {
    pub fn is_empty(&self) -> bool {
        self.first.is_none()
    }

    pub fn prepend(&mut self, attribute: Box<dyn Attribute>) {
        self.link(AttributeNode::Single(attribute));
    }

    pub fn prepend_group(&mut self, attributes: Vec<Box<dyn Attribute>>) {
        self.link(AttributeNode::Group(attributes));
    }

    fn link(&mut self, node: AttributeNode) {
        let next = self.first.take();
        self.first = Some(Box::new(Link { node, next }));
    }

    /// Attributes in emission order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Attribute> {
        std::iter::successors(self.first.as_deref(), |link| link.next.as_deref())
            .flat_map(|link| link.node.attributes())
            .map(|attribute| &**attribute)
    }

    /// Number of `attribute_info` structures, which a group may make differ from the
    /// number of visits.
    pub fn attribute_count(&self) -> usize {
        self.iter().count()
    }

    /// Size of every attribute in the chain; registers their names.
    pub fn compute_attributes_size(&self, symbols: &mut SymbolTable) -> usize {
        self.iter()
            .map(|attribute| {
                symbols.add_utf8(attribute.name());
                let mut info = ByteVector::new();
                attribute.write(symbols, &mut info);
                6 + info.len()
            })
            .sum()
    }

    pub fn put_attributes(&self, symbols: &mut SymbolTable, output: &mut ByteVector) {
        for attribute in self.iter() {
            let name_index = symbols.add_utf8(attribute.name());
            let mut info = ByteVector::new();
            attribute.write(symbols, &mut info);
            output
                .put_u16(name_index)
                .put_u32(info.len() as u32)
                .put_bytes(info.as_slice());
        }
    }
}

/// A flag that old class file versions can only express with an attribute.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FlagAttribute {
    pub(crate) flag: AccessFlags,
    pub(crate) name: &'static str,
    /// First major version whose `access_flags` item carries the flag.
    native_since: Option<u16>,
}

pub(crate) const SYNTHETIC: FlagAttribute = FlagAttribute {
    flag: AccessFlags::SYNTHETIC,
    name: "Synthetic",
    native_since: Some(49),
};

pub(crate) const DEPRECATED: FlagAttribute = FlagAttribute {
    flag: AccessFlags::DEPRECATED,
    name: "Deprecated",
    native_since: None,
};

pub(crate) const FLAG_ATTRIBUTES: [FlagAttribute; 2] = [SYNTHETIC, DEPRECATED];

impl FlagAttribute {
    pub(crate) fn uses_attribute(&self, major_version: u16) -> bool {
        self.native_since
            .map_or(true, |version| major_version < version)
    }

    /// The marker attribute for `flags`, if the flag is set and `major_version` needs it.
    pub(crate) fn attribute(
        &self,
        flags: AccessFlags,
        major_version: u16,
    ) -> Option<StandardAttribute<'static>> {
        (flags.contains(self.flag) && self.uses_attribute(major_version))
            .then(|| StandardAttribute::Marker(self.name))
    }
}

/// Flags removed from `access_flags` because `major_version` writes them as attributes.
pub(crate) fn attribute_flags_mask(major_version: u16) -> AccessFlags {
    FLAG_ATTRIBUTES
        .iter()
        .filter(|flag_attribute| flag_attribute.uses_attribute(major_version))
        .fold(AccessFlags::empty(), |mask, flag_attribute| {
            mask | flag_attribute.flag
        })
}

/// An attribute defined by the class file format, in the shape of its body.
#[derive(Debug)]
pub(crate) enum StandardAttribute<'a> {
    /// Empty body: `Synthetic`, `Deprecated`.
    Marker(&'static str),
    /// A single constant pool index: `ConstantValue`, `Signature`, `SourceFile`, `NestHost`.
    Index(&'static str, u16),
    /// A counted list of class indices: `Exceptions`, `NestMembers`, `PermittedSubclasses`.
    Classes(&'static str, &'a [u16]),
    /// A body built while visiting.
    Bytes(&'static str, &'a [u8]),
    Annotations(&'static str, &'a AnnotationChain),
    ParameterAnnotations(&'static str, &'a [AnnotationChain]),
}

impl StandardAttribute<'_> {
    fn name(&self) -> &'static str {
        match self {
            StandardAttribute::Marker(name)
            | StandardAttribute::Index(name, _)
            | StandardAttribute::Classes(name, _)
            | StandardAttribute::Bytes(name, _)
            | StandardAttribute::Annotations(name, _)
            | StandardAttribute::ParameterAnnotations(name, _) => *name,
        }
    }

    pub(crate) fn compute_size(&self, symbols: &mut SymbolTable) -> usize {
        match self {
            StandardAttribute::Annotations(name, chain) => {
                chain.compute_annotations_size(name, symbols)
            }
            StandardAttribute::ParameterAnnotations(name, chains) => {
                AnnotationChain::compute_parameter_annotations_size(name, chains, symbols)
            }
            StandardAttribute::Marker(name) => {
                symbols.add_utf8(name);
                6
            }
            StandardAttribute::Index(name, _) => {
                symbols.add_utf8(name);
                8
            }
            StandardAttribute::Classes(name, classes) => {
                symbols.add_utf8(name);
                8 + 2 * classes.len()
            }
            StandardAttribute::Bytes(name, bytes) => {
                symbols.add_utf8(name);
                6 + bytes.len()
            }
        }
    }

    pub(crate) fn put(&self, symbols: &mut SymbolTable, output: &mut ByteVector) {
        let name_index = symbols.add_utf8(self.name());
        match self {
            StandardAttribute::Annotations(_, chain) => chain.put_annotations(name_index, output),
            StandardAttribute::ParameterAnnotations(_, chains) => {
                AnnotationChain::put_parameter_annotations(name_index, chains, output)
            }
            StandardAttribute::Marker(_) => {
                output.put_u16(name_index).put_u32(0);
            }
            StandardAttribute::Index(_, index) => {
                output.put_u16(name_index).put_u32(2).put_u16(*index);
            }
            StandardAttribute::Classes(_, classes) => {
                output
                    .put_u16(name_index)
                    .put_u32(2 + 2 * classes.len() as u32)
                    .put_u16(classes.len() as u16);
                for class in classes.iter() {
                    output.put_u16(*class);
                }
            }
            StandardAttribute::Bytes(_, bytes) => {
                output
                    .put_u16(name_index)
                    .put_u32(bytes.len() as u32)
                    .put_bytes(bytes);
            }
        }
    }
}

/// Size of `attributes_count` and of every standard and custom attribute.
pub(crate) fn compute_attributes_size(
    standard: &[StandardAttribute],
    custom: &AttributeChain,
    symbols: &mut SymbolTable,
) -> usize {
    2 + standard
        .iter()
        .map(|attribute| attribute.compute_size(symbols))
        .sum::<usize>()
        + custom.compute_attributes_size(symbols)
}

/// Puts `attributes_count`, the standard attributes in order, then the custom ones.
pub(crate) fn put_attributes(
    standard: &[StandardAttribute],
    custom: &AttributeChain,
    symbols: &mut SymbolTable,
    output: &mut ByteVector,
) {
    output.put_u16((standard.len() + custom.attribute_count()) as u16);
    for attribute in standard {
        attribute.put(symbols, output);
    }
    custom.put_attributes(symbols, output);
}



#[cfg(test)]
mod standard_attribute_tests {
    use super::*;

    #[test]
    fn it_should_agree_on_size_and_written_bytes() {
        let mut symbols = SymbolTable::new();
        let classes = [4, 5];
        let attributes = [
            StandardAttribute::Marker("Synthetic"),
            StandardAttribute::Index("Signature", 9),
            StandardAttribute::Classes("Exceptions", &classes),
            StandardAttribute::Bytes("AnnotationDefault", &[b'Z', 0, 1]),
        ];

        for attribute in &attributes {
            let size = attribute.compute_size(&mut symbols);
            let mut output = ByteVector::new();
            attribute.put(&mut symbols, &mut output);

            assert_eq!(size, output.len(), "{:?}", attribute);
        }
    }

    #[test]
    fn it_should_write_a_counted_class_list() {
        let mut symbols = SymbolTable::new();
        let mut output = ByteVector::new();
        StandardAttribute::Classes("NestMembers", &[7, 8]).put(&mut symbols, &mut output);

        assert_eq!(
            &[0, 1, 0, 0, 0, 6, 0, 2, 0, 7, 0, 8],
            output.as_slice()
        );
    }
}
