use std::{env, fs::File, path::PathBuf};

use cafe_class_writer::{AccessFlags, ClassVersion, ClassWriter, Constant, RawAttribute};

fn main() {
    pretty_env_logger::init();

    let path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("MyClass.class"));

    let mut class = ClassWriter::new();
    class.visit(
        ClassVersion::V1_8,
        AccessFlags::PUBLIC | AccessFlags::SUPER,
        "my/MyClass",
        None,
        Some("java/lang/Object"),
        &[],
    );
    class.visit_source("MyClass.java");

    let mut field = class.visit_field(
        AccessFlags::PUBLIC | AccessFlags::STATIC | AccessFlags::FINAL,
        "ANSWER",
        "I",
        None,
        Some(&Constant::Integer(42)),
    );
    field.visit_annotation("Ljava/lang/Deprecated;", true).visit_end();
    field.visit_end();

    let mut method = class.visit_method(
        AccessFlags::PUBLIC | AccessFlags::ABSTRACT | AccessFlags::DEPRECATED,
        "add",
        "(I)F",
        None,
        &["java/io/IOException"],
    );
    method.visit_parameter(Some("value"), AccessFlags::FINAL);
    method.visit_end();

    class.visit_attribute(Box::new(RawAttribute::new("my.Marker", Vec::new())));
    class.visit_end();

    let file = File::create(&path).unwrap();
    class.write_to(file).unwrap();
    println!("Wrote {}", path.display());
}
