use std::io::Write;

use crate::{
    annotation::MemberAnnotations,
    attributes::{self, StandardAttribute, DEPRECATED, SYNTHETIC},
    AccessFlags, AnnotationVisitor, Attribute, AttributeChain, ByteVector, ClassVersion,
    ClassWriterError, Constant, FieldVisitor, FieldWriter, MethodVisitor, MethodWriter, Result,
    SymbolTable, TypePath, TypeReference,
};

const MAGIC: u32 = 0xCAFE_BABE;

/// The class level attributes, kept apart from the symbol table so both can be borrowed at once.
#[derive(Debug, Default)]
struct ClassAttributes {
    signature_index: Option<u16>,
    source_file_index: Option<u16>,
    /// `InnerClasses` body: `number_of_classes` followed by the entries.
    inner_classes: Option<ByteVector>,
    /// `EnclosingMethod` body.
    enclosing_method: Option<ByteVector>,
    nest_host_index: Option<u16>,
    nest_members: Vec<u16>,
    permitted_subclasses: Vec<u16>,
    annotations: MemberAnnotations,
    custom: AttributeChain,
}

impl ClassAttributes {
    fn standard(&self, access_flags: AccessFlags, major_version: u16) -> Vec<StandardAttribute<'_>> {
        let mut attributes = Vec::new();
        if let Some(inner_classes) = &self.inner_classes {
            attributes.push(StandardAttribute::Bytes(
                "InnerClasses",
                inner_classes.as_slice(),
            ));
        }
        if let Some(enclosing_method) = &self.enclosing_method {
            attributes.push(StandardAttribute::Bytes(
                "EnclosingMethod",
                enclosing_method.as_slice(),
            ));
        }
        attributes.extend(SYNTHETIC.attribute(access_flags, major_version));
        if let Some(index) = self.signature_index {
            attributes.push(StandardAttribute::Index("Signature", index));
        }
        if let Some(index) = self.source_file_index {
            attributes.push(StandardAttribute::Index("SourceFile", index));
        }
        attributes.extend(DEPRECATED.attribute(access_flags, major_version));
        self.annotations.push_attributes(&mut attributes);
        if let Some(index) = self.nest_host_index {
            attributes.push(StandardAttribute::Index("NestHost", index));
        }
        if !self.nest_members.is_empty() {
            attributes.push(StandardAttribute::Classes("NestMembers", &self.nest_members));
        }
        if !self.permitted_subclasses.is_empty() {
            attributes.push(StandardAttribute::Classes(
                "PermittedSubclasses",
                &self.permitted_subclasses,
            ));
        }
        attributes
    }
}

/// Builds a whole class file.
///
/// Fields and methods are written in the order they are visited. [`ClassWriter::to_bytes`]
/// sizes every structure first, so the constant pool is complete before anything is written.
#[derive(Debug, Default)]
pub struct ClassWriter {
    symbols: SymbolTable,
    access_flags: AccessFlags,
    this_class: u16,
    super_class: u16,
    interfaces: Vec<u16>,
    fields: Vec<FieldWriter>,
    methods: Vec<MethodWriter>,
    attributes: ClassAttributes,
}

impl ClassWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Gives access to the constant pool, e.g. to add constants referenced by custom
    /// attributes.
    pub fn symbols_mut(&mut self) -> &mut SymbolTable {
        &mut self.symbols
    }

    /// Starts the class. `super_name` is `None` only for `java/lang/Object` and modules.
    pub fn visit(
        &mut self,
        version: ClassVersion,
        access_flags: AccessFlags,
        name: &str,
        signature: Option<&str>,
        super_name: Option<&str>,
        interfaces: &[&str],
    ) {
        self.access_flags = access_flags;
        self.this_class = self.symbols.set_version_and_class_name(version, name);
        if let Some(signature) = signature {
            self.attributes.signature_index = Some(self.symbols.add_utf8(signature));
        }
        self.super_class = super_name.map_or(0, |super_name| self.symbols.add_class(super_name));
        self.interfaces = interfaces
            .iter()
            .map(|interface| self.symbols.add_class(interface))
            .collect();
    }

    pub fn visit_source(&mut self, file: &str) {
        self.attributes.source_file_index = Some(self.symbols.add_utf8(file));
    }

    pub fn visit_nest_host(&mut self, nest_host: &str) {
        self.attributes.nest_host_index = Some(self.symbols.add_class(nest_host));
    }

    pub fn visit_nest_member(&mut self, nest_member: &str) {
        let index = self.symbols.add_class(nest_member);
        self.attributes.nest_members.push(index);
    }

    pub fn visit_permitted_subclass(&mut self, permitted_subclass: &str) {
        let index = self.symbols.add_class(permitted_subclass);
        self.attributes.permitted_subclasses.push(index);
    }

    /// Sets the enclosing class, and method if any, of a local or anonymous class.
    pub fn visit_outer_class(&mut self, owner: &str, name: Option<&str>, descriptor: Option<&str>) {
        let class_index = self.symbols.add_class(owner);
        let method_index = match (name, descriptor) {
            (Some(name), Some(descriptor)) => self.symbols.add_name_and_type(name, descriptor),
            _ => 0,
        };
        let mut enclosing_method = ByteVector::with_capacity(4);
        enclosing_method.put_u16(class_index).put_u16(method_index);
        self.attributes.enclosing_method = Some(enclosing_method);
    }

    pub fn visit_inner_class(
        &mut self,
        name: &str,
        outer_name: Option<&str>,
        inner_name: Option<&str>,
        access_flags: AccessFlags,
    ) {
        let inner_class_index = self.symbols.add_class(name);
        let outer_class_index = outer_name.map_or(0, |outer_name| self.symbols.add_class(outer_name));
        let inner_name_index = inner_name.map_or(0, |inner_name| self.symbols.add_utf8(inner_name));

        let inner_classes = self.attributes.inner_classes.get_or_insert_with(|| {
            let mut inner_classes = ByteVector::new();
            inner_classes.put_u16(0);
            inner_classes
        });
        let count = u16::from_be_bytes([inner_classes.as_slice()[0], inner_classes.as_slice()[1]]);
        inner_classes.patch_u16(0, count.wrapping_add(1));
        inner_classes
            .put_u16(inner_class_index)
            .put_u16(outer_class_index)
            .put_u16(inner_name_index)
            .put_u16(access_flags.to_u2(AccessFlags::empty()));
    }

    pub fn visit_annotation(&mut self, descriptor: &str, visible: bool) -> AnnotationVisitor<'_> {
        self.attributes
            .annotations
            .visit_annotation(&mut self.symbols, descriptor, visible)
    }

    pub fn visit_type_annotation(
        &mut self,
        type_ref: TypeReference,
        type_path: Option<&TypePath>,
        descriptor: &str,
        visible: bool,
    ) -> AnnotationVisitor<'_> {
        self.attributes.annotations.visit_type_annotation(
            &mut self.symbols,
            type_ref,
            type_path,
            descriptor,
            visible,
        )
    }

    pub fn visit_attribute(&mut self, attribute: Box<dyn Attribute>) {
        self.attributes.custom.prepend(attribute);
    }

    pub fn visit_attribute_group(&mut self, attributes: Vec<Box<dyn Attribute>>) {
        self.attributes.custom.prepend_group(attributes);
    }

    /// Adds a field and returns a visitor for its optional parts.
    pub fn visit_field(
        &mut self,
        access_flags: AccessFlags,
        name: &str,
        descriptor: &str,
        signature: Option<&str>,
        value: Option<&Constant>,
    ) -> FieldVisitor<'_> {
        let mut field = FieldWriter::new(&mut self.symbols, access_flags, name, descriptor);
        let mut visitor = field.visitor(&mut self.symbols);
        if let Some(signature) = signature {
            visitor.visit_signature(signature);
        }
        if let Some(value) = value {
            visitor.visit_constant_value(value);
        }
        visitor.visit_end();

        let index = self.fields.len();
        self.fields.push(field);
        self.fields[index].visitor(&mut self.symbols)
    }

    /// Adds a method and returns a visitor for its optional parts.
    pub fn visit_method(
        &mut self,
        access_flags: AccessFlags,
        name: &str,
        descriptor: &str,
        signature: Option<&str>,
        exceptions: &[&str],
    ) -> MethodVisitor<'_> {
        let mut method = MethodWriter::new(&mut self.symbols, access_flags, name, descriptor);
        let mut visitor = method.visitor(&mut self.symbols);
        if let Some(signature) = signature {
            visitor.visit_signature(signature);
        }
        for exception in exceptions {
            visitor.visit_exception(exception);
        }
        visitor.visit_end();

        let index = self.methods.len();
        self.methods.push(method);
        self.methods[index].visitor(&mut self.symbols)
    }

    pub fn visit_end(&mut self) {}

    /// Sizes every structure, then writes the class file.
    ///
    /// Fails with [`ClassWriterError::MissingClassName`] if [`ClassWriter::visit`] was never
    /// called.
    pub fn to_bytes(mut self) -> Result<Vec<u8>> {
        if self.symbols.class_name().is_none() {
            log::warn!("Class writer finished without a class name");
            return Err(ClassWriterError::MissingClassName);
        }
        let major_version = self.symbols.major_version();

        // Sizing adds the attribute names, so the constant pool is sized last.
        let fields_size: usize = self
            .fields
            .iter()
            .map(|field| field.compute_field_info_size(&mut self.symbols))
            .sum();
        let methods_size: usize = self
            .methods
            .iter()
            .map(|method| method.compute_method_info_size(&mut self.symbols))
            .sum();
        let standard = self.attributes.standard(self.access_flags, major_version);
        let attributes_size =
            attributes::compute_attributes_size(&standard, &self.attributes.custom, &mut self.symbols);
        // magic, versions, access_flags, this_class, super_class and the three counts
        let size = 20
            + self.symbols.constant_pool_size()
            + 2 * self.interfaces.len()
            + fields_size
            + methods_size
            + attributes_size;

        let mut output = ByteVector::with_capacity(size);
        let version = self.symbols.version();
        output
            .put_u32(MAGIC)
            .put_u16(version.minor)
            .put_u16(version.major);
        self.symbols.put_constant_pool(&mut output)?;

        let mask = attributes::attribute_flags_mask(major_version) | AccessFlags::RECORD;
        output
            .put_u16(self.access_flags.to_u2(mask))
            .put_u16(self.this_class)
            .put_u16(self.super_class)
            .put_u16(self.interfaces.len() as u16);
        for interface in &self.interfaces {
            output.put_u16(*interface);
        }

        output.put_u16(self.fields.len() as u16);
        for field in &self.fields {
            field.put_field_info(&mut self.symbols, &mut output);
        }
        output.put_u16(self.methods.len() as u16);
        for method in &self.methods {
            method.put_method_info(&mut self.symbols, &mut output);
        }
        attributes::put_attributes(
            &standard,
            &self.attributes.custom,
            &mut self.symbols,
            &mut output,
        );

        if output.len() != size {
            return Err(ClassWriterError::SizeMismatch {
                computed: size,
                written: output.len(),
            });
        }

        log::debug!(
            "Wrote class {} ({}): {} fields, {} methods, {} constant pool slots, {} bytes",
            self.symbols.class_name().unwrap_or("<unnamed>"),
            version,
            self.fields.len(),
            self.methods.len(),
            self.symbols.constant_pool_count() - 1,
            size
        );
        Ok(output.into_vec())
    }

    pub fn write_to(self, mut writer: impl Write) -> Result<()> {
        writer.write_all(&self.to_bytes()?)?;
        Ok(())
    }
}
