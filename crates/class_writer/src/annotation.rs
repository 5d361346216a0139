use crate::{
    attributes::StandardAttribute, ByteVector, SymbolTable, TypePath, TypeReference,
};

/// A primitive, string, class or array value of an annotation element.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationValue {
    Boolean(bool),
    Byte(i8),
    Char(u16),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    /// A class literal, given by its field descriptor (e.g. `Ljava/lang/String;` or `I`).
    Class(String),
    Array(Vec<AnnotationValue>),
}

impl From<bool> for AnnotationValue {
    fn from(value: bool) -> Self {
        AnnotationValue::Boolean(value)
    }
}

impl From<i32> for AnnotationValue {
    fn from(value: i32) -> Self {
        AnnotationValue::Int(value)
    }
}

impl From<&str> for AnnotationValue {
    fn from(value: &str) -> Self {
        AnnotationValue::String(value.to_owned())
    }
}

fn put_value(symbols: &mut SymbolTable, output: &mut ByteVector, value: &AnnotationValue) {
    match value {
        AnnotationValue::Boolean(b) => {
            output.put_12(b'Z', symbols.add_integer(*b as i32));
        }
        AnnotationValue::Byte(b) => {
            output.put_12(b'B', symbols.add_integer(*b as i32));
        }
        AnnotationValue::Char(c) => {
            output.put_12(b'C', symbols.add_integer(*c as i32));
        }
        AnnotationValue::Short(s) => {
            output.put_12(b'S', symbols.add_integer(*s as i32));
        }
        AnnotationValue::Int(i) => {
            output.put_12(b'I', symbols.add_integer(*i));
        }
        AnnotationValue::Long(l) => {
            output.put_12(b'J', symbols.add_long(*l));
        }
        AnnotationValue::Float(f) => {
            output.put_12(b'F', symbols.add_float(*f));
        }
        AnnotationValue::Double(d) => {
            output.put_12(b'D', symbols.add_double(*d));
        }
        AnnotationValue::String(s) => {
            output.put_12(b's', symbols.add_utf8(s));
        }
        AnnotationValue::Class(descriptor) => {
            output.put_12(b'c', symbols.add_utf8(descriptor));
        }
        AnnotationValue::Array(values) => {
            output.put_12(b'[', values.len() as u16);
            for value in values {
                put_value(symbols, output, value);
            }
        }
    }
}

/// Writes the element values of one annotation, array or default value.
///
/// The element count reserved in front of the values is patched after every element, so
/// the bytes are complete whenever the visitor is dropped.
pub struct AnnotationVisitor<'a> {
    symbols: &'a mut SymbolTable,
    output: &'a mut ByteVector,
    /// Array elements and default values have no `element_name_index`.
    use_named_values: bool,
    num_element_values_offset: Option<usize>,
    num_element_values: u16,
}

impl<'a> AnnotationVisitor<'a> {
    pub(crate) fn new(
        symbols: &'a mut SymbolTable,
        output: &'a mut ByteVector,
        use_named_values: bool,
        num_element_values_offset: Option<usize>,
    ) -> Self {
        Self {
            symbols,
            output,
            use_named_values,
            num_element_values_offset,
            num_element_values: 0,
        }
    }

    /// Adds a primitive, string, class or array element. `name` is ignored inside arrays.
    pub fn visit(&mut self, name: &str, value: impl Into<AnnotationValue>) {
        self.put_name(name);
        put_value(&mut *self.symbols, &mut *self.output, &value.into());
    }

    pub fn visit_enum(&mut self, name: &str, descriptor: &str, value: &str) {
        self.put_name(name);
        let type_name_index = self.symbols.add_utf8(descriptor);
        let const_name_index = self.symbols.add_utf8(value);
        self.output
            .put_12(b'e', type_name_index)
            .put_u16(const_name_index);
    }

    /// Starts a nested annotation element.
    pub fn visit_annotation(&mut self, name: &str, descriptor: &str) -> AnnotationVisitor<'_> {
        self.put_name(name);
        let type_index = self.symbols.add_utf8(descriptor);
        self.output.put_12(b'@', type_index).put_u16(0);
        let offset = self.output.len() - 2;
        AnnotationVisitor::new(&mut *self.symbols, &mut *self.output, true, Some(offset))
    }

    /// Starts an array element; the values of the returned visitor are its elements.
    pub fn visit_array(&mut self, name: &str) -> AnnotationVisitor<'_> {
        self.put_name(name);
        self.output.put_12(b'[', 0);
        let offset = self.output.len() - 2;
        AnnotationVisitor::new(&mut *self.symbols, &mut *self.output, false, Some(offset))
    }

    pub fn visit_end(self) {}

    fn put_name(&mut self, name: &str) {
        self.num_element_values += 1;
        if let Some(offset) = self.num_element_values_offset {
            self.output.patch_u16(offset, self.num_element_values);
        }
        if self.use_named_values {
            let name_index = self.symbols.add_utf8(name);
            self.output.put_u16(name_index);
        }
    }
}

#[derive(Debug)]
struct AnnotationNode {
    bytes: ByteVector,
    previous: Option<Box<AnnotationNode>>,
}

/// The annotations of one kind (plain or type) and visibility attached to a structure.
///
/// New annotations are linked in front of the previous ones, so the chain (and the emitted
/// attribute) lists them in reverse order of visit.
#[derive(Debug, Default)]
pub struct AnnotationChain {
    last: Option<Box<AnnotationNode>>,
}

impl AnnotationChain {
    pub fn is_empty(&self) -> bool {
        self.last.is_none()
    }

    /// Number of annotations in the chain.
    pub fn len(&self) -> usize {
        self.nodes().count()
    }

    /// Links a new annotation whose header is already in `bytes` and returns its buffer.
    pub(crate) fn push(&mut self, bytes: ByteVector) -> &mut ByteVector {
        let previous = self.last.take();
        &mut self.last.insert(Box::new(AnnotationNode { bytes, previous })).bytes
    }

    fn nodes(&self) -> impl Iterator<Item = &AnnotationNode> {
        std::iter::successors(self.last.as_deref(), |node| node.previous.as_deref())
    }

    /// Length of the `annotations` array items.
    fn payload_size(&self) -> usize {
        self.nodes().map(|node| node.bytes.len()).sum()
    }

    /// Size of a `Runtime*Annotations` attribute holding this chain; registers `name`.
    pub(crate) fn compute_annotations_size(&self, name: &str, symbols: &mut SymbolTable) -> usize {
        symbols.add_utf8(name);
        // attribute_name_index, attribute_length, num_annotations
        8 + self.payload_size()
    }

    pub(crate) fn put_annotations(&self, name_index: u16, output: &mut ByteVector) {
        output
            .put_u16(name_index)
            .put_u32(2 + self.payload_size() as u32)
            .put_u16(self.len() as u16);
        for node in self.nodes() {
            output.put_bytes(node.bytes.as_slice());
        }
    }

    pub(crate) fn compute_parameter_annotations_size(
        name: &str,
        chains: &[AnnotationChain],
        symbols: &mut SymbolTable,
    ) -> usize {
        symbols.add_utf8(name);
        if chains.len() > u8::MAX as usize {
            log::warn!(
                "{}: dropping annotations of parameters past {}",
                name,
                u8::MAX
            );
        }
        6 + Self::parameter_annotations_length(chains)
    }

    pub(crate) fn put_parameter_annotations(
        name_index: u16,
        chains: &[AnnotationChain],
        output: &mut ByteVector,
    ) {
        let chains = Self::writable(chains);
        output
            .put_u16(name_index)
            .put_u32(Self::parameter_annotations_length(chains) as u32)
            .put_u8(chains.len() as u8);
        for chain in chains {
            output.put_u16(chain.len() as u16);
            for node in chain.nodes() {
                output.put_bytes(node.bytes.as_slice());
            }
        }
    }

    /// `num_parameters` is a `u1`.
    fn writable(chains: &[AnnotationChain]) -> &[AnnotationChain] {
        &chains[..chains.len().min(u8::MAX as usize)]
    }

    fn parameter_annotations_length(chains: &[AnnotationChain]) -> usize {
        1 + Self::writable(chains)
            .iter()
            .map(|chain| 2 + chain.payload_size())
            .sum::<usize>()
    }
}

/// The four annotation chains of a class, field or method.
#[derive(Debug, Default)]
pub(crate) struct MemberAnnotations {
    visible: AnnotationChain,
    invisible: AnnotationChain,
    visible_type: AnnotationChain,
    invisible_type: AnnotationChain,
}

impl MemberAnnotations {
    pub(crate) fn visit_annotation<'a>(
        &'a mut self,
        symbols: &'a mut SymbolTable,
        descriptor: &str,
        visible: bool,
    ) -> AnnotationVisitor<'a> {
        let chain = if visible {
            &mut self.visible
        } else {
            &mut self.invisible
        };
        start_annotation(symbols, chain, ByteVector::new(), descriptor)
    }

    pub(crate) fn visit_type_annotation<'a>(
        &'a mut self,
        symbols: &'a mut SymbolTable,
        type_ref: TypeReference,
        type_path: Option<&TypePath>,
        descriptor: &str,
        visible: bool,
    ) -> AnnotationVisitor<'a> {
        let mut header = ByteVector::new();
        type_ref.put_target(&mut header);
        TypePath::put(type_path, &mut header);

        let chain = if visible {
            &mut self.visible_type
        } else {
            &mut self.invisible_type
        };
        start_annotation(symbols, chain, header, descriptor)
    }

    /// Appends the attributes of the non-empty chains, in class file order.
    pub(crate) fn push_attributes<'a>(&'a self, attributes: &mut Vec<StandardAttribute<'a>>) {
        [
            ("RuntimeVisibleAnnotations", &self.visible),
            ("RuntimeInvisibleAnnotations", &self.invisible),
            ("RuntimeVisibleTypeAnnotations", &self.visible_type),
            ("RuntimeInvisibleTypeAnnotations", &self.invisible_type),
        ]
        .into_iter()
        .filter(|(_, chain)| !chain.is_empty())
        .for_each(|(name, chain)| attributes.push(StandardAttribute::Annotations(name, chain)));
    }
}

/// Puts `type_index` and a zero `num_element_value_pairs` after `header` and links the
/// annotation into `chain`.
pub(crate) fn start_annotation<'a>(
    symbols: &'a mut SymbolTable,
    chain: &'a mut AnnotationChain,
    mut header: ByteVector,
    descriptor: &str,
) -> AnnotationVisitor<'a> {
    header.put_u16(symbols.add_utf8(descriptor)).put_u16(0);
    let offset = header.len() - 2;
    AnnotationVisitor::new(symbols, chain.push(header), true, Some(offset))
}


#[cfg(test)]
mod annotation_chain_tests {
    use super::*;

    #[test]
    fn it_should_write_annotations_in_reverse_order_of_visit() {
        let mut symbols = SymbolTable::new();
        let mut chain = AnnotationChain::default();
        start_annotation(&mut symbols, &mut chain, ByteVector::new(), "LFirst;");
        start_annotation(&mut symbols, &mut chain, ByteVector::new(), "LSecond;");

        let size = chain.compute_annotations_size("RuntimeVisibleAnnotations", &mut symbols);
        let mut output = ByteVector::new();
        chain.put_annotations(3, &mut output);

        assert_eq!(
            &[0, 3, 0, 0, 0, 10, 0, 2, 0, 2, 0, 0, 0, 1, 0, 0],
            output.as_slice()
        );
        assert_eq!(size, output.len());
    }

    #[test]
    fn it_should_size_parameter_annotations() {
        let mut symbols = SymbolTable::new();
        let mut chains = vec![AnnotationChain::default(), AnnotationChain::default()];
        start_annotation(&mut symbols, &mut chains[1], ByteVector::new(), "LA;");

        let size = AnnotationChain::compute_parameter_annotations_size(
            "RuntimeVisibleParameterAnnotations",
            &chains,
            &mut symbols,
        );
        let mut output = ByteVector::new();
        AnnotationChain::put_parameter_annotations(2, &chains, &mut output);

        assert_eq!(
            &[0, 2, 0, 0, 0, 9, 2, 0, 0, 0, 1, 0, 1, 0, 0],
            output.as_slice()
        );
        assert_eq!(size, output.len());
    }

    #[test]
    fn it_should_write_at_most_255_parameters() {
        let mut symbols = SymbolTable::new();
        let mut chains = Vec::new();
        chains.resize_with(256, AnnotationChain::default);
        start_annotation(&mut symbols, &mut chains[255], ByteVector::new(), "LA;");

        let size = AnnotationChain::compute_parameter_annotations_size(
            "RuntimeVisibleParameterAnnotations",
            &chains,
            &mut symbols,
        );
        let mut output = ByteVector::new();
        AnnotationChain::put_parameter_annotations(2, &chains, &mut output);

        assert_eq!(size, output.len());
        assert_eq!(255, output.as_slice()[6]);
        assert_eq!(6 + 1 + 2 * 255, output.len());
    }
}
