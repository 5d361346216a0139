use crate::{
    annotation::MemberAnnotations,
    attributes::{self, StandardAttribute, DEPRECATED, SYNTHETIC},
    AccessFlags, AnnotationVisitor, Attribute, AttributeChain, ByteVector, Constant, SymbolTable,
    TypePath, TypeReference,
};

/// Collects the contents of one `field_info` structure and writes it.
///
/// The field is built through a [`FieldVisitor`]. Once visiting is over,
/// [`FieldWriter::compute_field_info_size`] and [`FieldWriter::put_field_info`] walk the same
/// attribute list, so the size always matches the number of bytes written.
#[derive(Debug)]
pub struct FieldWriter {
    access_flags: AccessFlags,
    name_index: u16,
    descriptor_index: u16,
    signature_index: Option<u16>,
    constant_value_index: Option<u16>,
    annotations: MemberAnnotations,
    attributes: AttributeChain,
}

impl FieldWriter {
    pub fn new(
        symbols: &mut SymbolTable,
        access_flags: AccessFlags,
        name: &str,
        descriptor: &str,
    ) -> Self {
        Self {
            access_flags,
            name_index: symbols.add_utf8(name),
            descriptor_index: symbols.add_utf8(descriptor),
            signature_index: None,
            constant_value_index: None,
            annotations: MemberAnnotations::default(),
            attributes: AttributeChain::default(),
        }
    }

    pub fn visitor<'a>(&'a mut self, symbols: &'a mut SymbolTable) -> FieldVisitor<'a> {
        FieldVisitor {
            symbols,
            field: self,
        }
    }

    pub fn access_flags(&self) -> AccessFlags {
        self.access_flags
    }

    fn standard_attributes(&self, major_version: u16) -> Vec<StandardAttribute<'_>> {
        let mut attributes = Vec::new();
        if let Some(index) = self.constant_value_index {
            attributes.push(StandardAttribute::Index("ConstantValue", index));
        }
        attributes.extend(SYNTHETIC.attribute(self.access_flags, major_version));
        attributes.extend(DEPRECATED.attribute(self.access_flags, major_version));
        if let Some(index) = self.signature_index {
            attributes.push(StandardAttribute::Index("Signature", index));
        }
        self.annotations.push_attributes(&mut attributes);
        attributes
    }

    /// Size of the `field_info` structure. Adds the attribute names to the constant pool.
    pub fn compute_field_info_size(&self, symbols: &mut SymbolTable) -> usize {
        let standard = self.standard_attributes(symbols.major_version());
        let size = 6 + attributes::compute_attributes_size(&standard, &self.attributes, symbols);
        log::trace!(
            "field {:?}: {} bytes",
            symbols.utf8(self.name_index),
            size
        );
        size
    }

    pub fn put_field_info(&self, symbols: &mut SymbolTable, output: &mut ByteVector) {
        let major_version = symbols.major_version();
        let mask = attributes::attribute_flags_mask(major_version);
        output
            .put_u16(self.access_flags.to_u2(mask))
            .put_u16(self.name_index)
            .put_u16(self.descriptor_index);

        let standard = self.standard_attributes(major_version);
        attributes::put_attributes(&standard, &self.attributes, symbols, output);
    }
}

/// Visits the optional parts of a field.
pub struct FieldVisitor<'a> {
    symbols: &'a mut SymbolTable,
    field: &'a mut FieldWriter,
}

impl<'a> FieldVisitor<'a> {
    /// Sets the generic signature. A later call replaces an earlier one.
    pub fn visit_signature(&mut self, signature: &str) {
        self.field.signature_index = Some(self.symbols.add_utf8(signature));
    }

    /// Sets the initial value of a static field. A later call replaces an earlier one.
    pub fn visit_constant_value(&mut self, value: &Constant) {
        self.field.constant_value_index = Some(self.symbols.add_constant(value).index);
    }

    pub fn visit_annotation(&mut self, descriptor: &str, visible: bool) -> AnnotationVisitor<'_> {
        self.field
            .annotations
            .visit_annotation(&mut *self.symbols, descriptor, visible)
    }

    pub fn visit_type_annotation(
        &mut self,
        type_ref: TypeReference,
        type_path: Option<&TypePath>,
        descriptor: &str,
        visible: bool,
    ) -> AnnotationVisitor<'_> {
        self.field.annotations.visit_type_annotation(
            &mut *self.symbols,
            type_ref,
            type_path,
            descriptor,
            visible,
        )
    }

    pub fn visit_attribute(&mut self, attribute: Box<dyn Attribute>) {
        self.field.attributes.prepend(attribute);
    }

    pub fn visit_attribute_group(&mut self, attributes: Vec<Box<dyn Attribute>>) {
        self.field.attributes.prepend_group(attributes);
    }

    pub fn visit_end(self) {}
}
