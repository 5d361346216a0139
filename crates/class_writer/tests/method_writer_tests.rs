mod common;

use cafe_class_writer::{
    AccessFlags, ClassVersion, ClassWriter, RawAttribute, TargetType, TypeReference,
};
use common::{u2, with_class_file};

fn class(version: ClassVersion) -> ClassWriter {
    let mut class = ClassWriter::new();
    class.visit(
        version,
        AccessFlags::PUBLIC | AccessFlags::SUPER,
        "my/MyClass",
        None,
        Some("java/lang/Object"),
        &[],
    );
    class
}

#[test]
fn test_method_name_and_descriptor() {
    let mut class = class(ClassVersion::V1_8);
    class.visit_method(AccessFlags::PUBLIC, "<init>", "()V", None, &[]);
    class.visit_method(AccessFlags::PUBLIC, "add", "(I)F", None, &[]);

    with_class_file(class, |class_file| {
        assert_eq!("<init>", class_file.methods[0].name);
        assert_eq!("()V", class_file.methods[0].descriptor);
        assert_eq!("add", class_file.methods[1].name);
        assert_eq!("(I)F", class_file.methods[1].descriptor);
        assert_eq!(0x0001, class_file.methods[1].access_flags);
    });
}

#[test]
fn test_exceptions() {
    let mut class = class(ClassVersion::V1_8);
    class.visit_method(
        AccessFlags::PUBLIC,
        "read",
        "()I",
        None,
        &["java/io/IOException", "java/lang/InterruptedException"],
    );

    with_class_file(class, |class_file| {
        let exceptions = class_file.methods[0].attribute("Exceptions").unwrap();
        let info = &exceptions.info;
        assert_eq!(2, u2(info, 0));
        assert_eq!("java/io/IOException", class_file.class_name(u2(info, 2)));
        assert_eq!(
            "java/lang/InterruptedException",
            class_file.class_name(u2(info, 4))
        );
    });
}

#[test]
fn test_attribute_order() {
    let mut class = class(ClassVersion::V1_4);
    let mut method = class.visit_method(
        AccessFlags::PUBLIC | AccessFlags::SYNTHETIC | AccessFlags::DEPRECATED,
        "m",
        "(I)V",
        Some("<T:Ljava/lang/Object;>(I)V"),
        &["java/lang/Exception"],
    );
    method.visit_attribute(Box::new(RawAttribute::new("Custom", Vec::new())));
    method.visit_parameter(Some("i"), AccessFlags::empty());
    method.visit_parameter_annotation(0, "LInvisible;", false).visit_end();
    method.visit_parameter_annotation(0, "LVisible;", true).visit_end();
    method.visit_annotation_default().visit("", 1);
    method
        .visit_type_annotation(
            TypeReference::new(TargetType::MethodReturn),
            None,
            "LTypeInvisible;",
            false,
        )
        .visit_end();
    method
        .visit_type_annotation(
            TypeReference::new(TargetType::MethodReceiver),
            None,
            "LTypeVisible;",
            true,
        )
        .visit_end();
    method.visit_annotation("LInvisible;", false).visit_end();
    method.visit_annotation("LVisible;", true).visit_end();
    method.visit_end();

    with_class_file(class, |class_file| {
        let method = &class_file.methods[0];
        assert_eq!(0x0001, method.access_flags);
        assert_eq!(
            vec![
                "Exceptions",
                "Synthetic",
                "Deprecated",
                "Signature",
                "RuntimeVisibleAnnotations",
                "RuntimeInvisibleAnnotations",
                "RuntimeVisibleTypeAnnotations",
                "RuntimeInvisibleTypeAnnotations",
                "AnnotationDefault",
                "RuntimeVisibleParameterAnnotations",
                "RuntimeInvisibleParameterAnnotations",
                "MethodParameters",
                "Custom",
            ],
            method.attribute_names()
        );
    });
}

#[test]
fn test_synthetic_flag_since_java_5() {
    let mut class = class(ClassVersion::V1_5);
    class.visit_method(AccessFlags::BRIDGE | AccessFlags::SYNTHETIC, "m", "()V", None, &[]);

    with_class_file(class, |class_file| {
        assert_eq!(0x1040, class_file.methods[0].access_flags);
        assert!(class_file.methods[0].attributes.is_empty());
    });
}

#[test]
fn test_parameter_annotations() {
    let mut class = class(ClassVersion::V1_8);
    let mut method = class.visit_method(
        AccessFlags::PUBLIC,
        "m",
        "(ILjava/lang/String;)V",
        None,
        &[],
    );
    method.visit_parameter_annotation(1, "LA;", true).visit_end();
    method.visit_parameter_annotation(1, "LB;", true).visit_end();
    method.visit_end();

    with_class_file(class, |class_file| {
        let annotations = class_file.methods[0]
            .attribute("RuntimeVisibleParameterAnnotations")
            .unwrap();
        let info = &annotations.info;
        assert_eq!(2, info[0]);
        assert_eq!(0, u2(info, 1));
        assert_eq!(2, u2(info, 3));
        assert_eq!("LB;", class_file.utf8(u2(info, 5)));
        assert_eq!("LA;", class_file.utf8(u2(info, 9)));
        assert_eq!(1 + 2 + 2 + 8, info.len());
    });
}

#[test]
fn test_method_parameters() {
    let mut class = class(ClassVersion::V1_8);
    let mut method = class.visit_method(AccessFlags::PUBLIC, "m", "(II)V", None, &[]);
    method.visit_parameter(Some("first"), AccessFlags::FINAL);
    method.visit_parameter(None, AccessFlags::MANDATED);
    method.visit_end();

    with_class_file(class, |class_file| {
        let parameters = class_file.methods[0].attribute("MethodParameters").unwrap();
        let info = &parameters.info;
        assert_eq!(2, info[0]);
        assert_eq!("first", class_file.utf8(u2(info, 1)));
        assert_eq!(0x0010, u2(info, 3));
        assert_eq!(0, u2(info, 5));
        assert_eq!(0x8000, u2(info, 7));
    });
}

#[test]
fn test_annotation_default() {
    let mut class = class(ClassVersion::V1_8);
    let mut method = class.visit_method(
        AccessFlags::PUBLIC | AccessFlags::ABSTRACT,
        "level",
        "()Ljava/lang/annotation/RetentionPolicy;",
        None,
        &[],
    );
    method
        .visit_annotation_default()
        .visit_enum("", "Ljava/lang/annotation/RetentionPolicy;", "RUNTIME");
    method.visit_end();

    with_class_file(class, |class_file| {
        let default = class_file.methods[0].attribute("AnnotationDefault").unwrap();
        let info = &default.info;
        assert_eq!(5, info.len());
        assert_eq!(b'e', info[0]);
        assert_eq!(
            "Ljava/lang/annotation/RetentionPolicy;",
            class_file.utf8(u2(info, 1))
        );
        assert_eq!("RUNTIME", class_file.utf8(u2(info, 3)));
    });
}
