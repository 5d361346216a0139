use crate::{
    annotation::{start_annotation, AnnotationChain, MemberAnnotations},
    attributes::{self, StandardAttribute, DEPRECATED, SYNTHETIC},
    AccessFlags, AnnotationVisitor, Attribute, AttributeChain, ByteVector, SymbolTable, TypePath,
    TypeReference,
};

/// Counts the parameter types of a method descriptor such as `(I[JLjava/lang/String;)V`.
pub(crate) fn argument_count(descriptor: &str) -> usize {
    let mut count = 0;
    let mut chars = descriptor.chars().skip_while(|c| *c == '(');
    while let Some(c) = chars.next() {
        match c {
            ')' => break,
            '[' => continue,
            'L' => {
                chars.by_ref().find(|c| *c == ';');
                count += 1;
            }
            _ => count += 1,
        }
    }
    count
}

#[derive(Debug, Default)]
struct ParameterAnnotations {
    /// `num_parameters`, when it differs from the number of descriptor parameters.
    annotable_count: Option<u8>,
    /// Never shorter than the number of parameters written.
    chains: Vec<AnnotationChain>,
}

impl ParameterAnnotations {
    fn set_annotable_count(&mut self, count: u8) {
        self.annotable_count = Some(count);
        if !self.chains.is_empty() && self.chains.len() < count as usize {
            self.chains.resize_with(count as usize, AnnotationChain::default);
        }
    }

    fn chain(&mut self, parameter: u8, argument_count: usize) -> &mut AnnotationChain {
        let len = self
            .chains
            .len()
            .max(argument_count)
            .max(self.annotable_count.map_or(0, usize::from))
            .max(parameter as usize + 1);
        self.chains.resize_with(len, AnnotationChain::default);
        &mut self.chains[parameter as usize]
    }

    /// The `parameter_annotations` entries to write, or `None` if no parameter was annotated.
    ///
    /// Their number is the annotable count, or else the descriptor's parameter count, widened
    /// to reach the last annotated parameter.
    fn written(&self, argument_count: usize) -> Option<&[AnnotationChain]> {
        if self.chains.is_empty() {
            return None;
        }
        let annotated = self
            .chains
            .iter()
            .rposition(|chain| !chain.is_empty())
            .map_or(0, |last| last + 1);
        let count = self
            .annotable_count
            .map_or(argument_count, usize::from)
            .max(annotated);
        Some(&self.chains[..count])
    }
}

/// Collects the contents of one `method_info` structure and writes it.
///
/// Method bodies are not produced here: a `Code` attribute, if any, has to be supplied as a
/// custom attribute.
#[derive(Debug)]
pub struct MethodWriter {
    access_flags: AccessFlags,
    name_index: u16,
    descriptor_index: u16,
    argument_count: usize,
    exceptions: Vec<u16>,
    signature_index: Option<u16>,
    annotations: MemberAnnotations,
    default_value: Option<ByteVector>,
    visible_parameter_annotations: ParameterAnnotations,
    invisible_parameter_annotations: ParameterAnnotations,
    /// `MethodParameters` body: `parameters_count` followed by the parameters.
    parameters: Option<ByteVector>,
    attributes: AttributeChain,
}

impl MethodWriter {
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
            argument_count: argument_count(descriptor),
            exceptions: Vec::new(),
            signature_index: None,
            annotations: MemberAnnotations::default(),
            default_value: None,
            visible_parameter_annotations: ParameterAnnotations::default(),
            invisible_parameter_annotations: ParameterAnnotations::default(),
            parameters: None,
            attributes: AttributeChain::default(),
        }
    }

    pub fn visitor<'a>(&'a mut self, symbols: &'a mut SymbolTable) -> MethodVisitor<'a> {
        MethodVisitor {
            symbols,
            method: self,
        }
    }

    pub fn access_flags(&self) -> AccessFlags {
        self.access_flags
    }

    fn standard_attributes(&self, major_version: u16) -> Vec<StandardAttribute<'_>> {
        let mut attributes = Vec::new();
        if !self.exceptions.is_empty() {
            attributes.push(StandardAttribute::Classes("Exceptions", &self.exceptions));
        }
        attributes.extend(SYNTHETIC.attribute(self.access_flags, major_version));
        attributes.extend(DEPRECATED.attribute(self.access_flags, major_version));
        if let Some(index) = self.signature_index {
            attributes.push(StandardAttribute::Index("Signature", index));
        }
        self.annotations.push_attributes(&mut attributes);
        if let Some(default_value) = &self.default_value {
            attributes.push(StandardAttribute::Bytes(
                "AnnotationDefault",
                default_value.as_slice(),
            ));
        }
        if let Some(chains) = self.visible_parameter_annotations.written(self.argument_count) {
            attributes.push(StandardAttribute::ParameterAnnotations(
                "RuntimeVisibleParameterAnnotations",
                chains,
            ));
        }
        if let Some(chains) = self.invisible_parameter_annotations.written(self.argument_count) {
            attributes.push(StandardAttribute::ParameterAnnotations(
                "RuntimeInvisibleParameterAnnotations",
                chains,
            ));
        }
        if let Some(parameters) = &self.parameters {
            attributes.push(StandardAttribute::Bytes(
                "MethodParameters",
                parameters.as_slice(),
            ));
        }
        attributes
    }

    /// Size of the `method_info` structure. Adds the attribute names to the constant pool.
    pub fn compute_method_info_size(&self, symbols: &mut SymbolTable) -> usize {
        let standard = self.standard_attributes(symbols.major_version());
        let size = 6 + attributes::compute_attributes_size(&standard, &self.attributes, symbols);
        log::trace!(
            "method {:?}: {} bytes",
            symbols.utf8(self.name_index),
            size
        );
        size
    }

    pub fn put_method_info(&self, symbols: &mut SymbolTable, output: &mut ByteVector) {
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

/// Visits the optional parts of a method.
pub struct MethodVisitor<'a> {
    symbols: &'a mut SymbolTable,
    method: &'a mut MethodWriter,
}

impl<'a> MethodVisitor<'a> {
    /// Sets the generic signature. A later call replaces an earlier one.
    pub fn visit_signature(&mut self, signature: &str) {
        self.method.signature_index = Some(self.symbols.add_utf8(signature));
    }

    /// Adds a checked exception, given by its internal name.
    pub fn visit_exception(&mut self, internal_name: &str) {
        let index = self.symbols.add_class(internal_name);
        self.method.exceptions.push(index);
    }

    /// Adds an entry to `MethodParameters`; `name` is `None` for a nameless parameter.
    pub fn visit_parameter(&mut self, name: Option<&str>, access_flags: AccessFlags) {
        let name_index = name.map_or(0, |name| self.symbols.add_utf8(name));
        let parameters = self.method.parameters.get_or_insert_with(|| {
            let mut parameters = ByteVector::new();
            parameters.put_u8(0);
            parameters
        });
        let count = parameters.as_slice()[0];
        if count == u8::MAX {
            log::warn!("Dropping parameter {:?}: MethodParameters is full", name);
            return;
        }
        parameters.patch_u8(0, count + 1);
        parameters
            .put_u16(name_index)
            .put_u16(access_flags.to_u2(AccessFlags::empty()));
    }

    /// Starts the default value of an annotation interface element. The returned visitor
    /// takes exactly one value; its name is ignored.
    pub fn visit_annotation_default(&mut self) -> AnnotationVisitor<'_> {
        let default_value = self.method.default_value.insert(ByteVector::new());
        AnnotationVisitor::new(&mut *self.symbols, default_value, false, None)
    }

    pub fn visit_annotation(&mut self, descriptor: &str, visible: bool) -> AnnotationVisitor<'_> {
        self.method
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
        self.method.annotations.visit_type_annotation(
            &mut *self.symbols,
            type_ref,
            type_path,
            descriptor,
            visible,
        )
    }

    /// Sets `num_parameters` of the parameter annotations attribute; by default it is the
    /// number of parameters in the descriptor. Applies whenever it is called.
    pub fn visit_annotable_parameter_count(&mut self, count: u8, visible: bool) {
        if visible {
            self.method.visible_parameter_annotations.set_annotable_count(count);
        } else {
            self.method.invisible_parameter_annotations.set_annotable_count(count);
        }
    }

    pub fn visit_parameter_annotation(
        &mut self,
        parameter: u8,
        descriptor: &str,
        visible: bool,
    ) -> AnnotationVisitor<'_> {
        let argument_count = self.method.argument_count;
        let parameter_annotations = if visible {
            &mut self.method.visible_parameter_annotations
        } else {
            &mut self.method.invisible_parameter_annotations
        };
        start_annotation(
            &mut *self.symbols,
            parameter_annotations.chain(parameter, argument_count),
            ByteVector::new(),
            descriptor,
        )
    }

    pub fn visit_attribute(&mut self, attribute: Box<dyn Attribute>) {
        self.method.attributes.prepend(attribute);
    }

    pub fn visit_attribute_group(&mut self, attributes: Vec<Box<dyn Attribute>>) {
        self.method.attributes.prepend_group(attributes);
    }

    pub fn visit_end(self) {}
}

#[cfg(test)]
mod argument_count_tests {
    use super::*;

    #[test]
    fn it_should_count_primitive_array_and_object_parameters() {
        assert_eq!(0, argument_count("()V"));
        assert_eq!(3, argument_count("(I[JLjava/lang/String;)V"));
        assert_eq!(2, argument_count("([[Ljava/lang/Object;D)Ljava/lang/Object;"));
    }
}
