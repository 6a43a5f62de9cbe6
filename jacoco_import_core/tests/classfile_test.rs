mod support;

use jacoco_import_core::classfile::read_class_file;
use jacoco_import_core::error::ClassFileError;

use support::class_file;

#[test]
fn reads_class_name_and_source_file() {
    let info = read_class_file(&class_file("org/example/Hello", Some("Hello.gs"))).unwrap();
    assert_eq!(info.name, "org/example/Hello");
    assert_eq!(info.source_file.as_deref(), Some("Hello.gs"));
    assert_eq!(info.major_version, 0x34);
    assert_eq!(info.package(), "org/example");
    assert_eq!(info.simple_name(), "Hello");
}

#[test]
fn inner_classes_keep_their_binary_name() {
    let info =
        read_class_file(&class_file("org/example/Hello$InnerClass", Some("Hello.gs"))).unwrap();
    assert_eq!(info.simple_name(), "Hello$InnerClass");
    assert_eq!(info.source_file.as_deref(), Some("Hello.gs"));
}

#[test]
fn default_package_classes_have_an_empty_package() {
    let info = read_class_file(&class_file("Hello", None)).unwrap();
    assert_eq!(info.package(), "");
    assert_eq!(info.simple_name(), "Hello");
    assert_eq!(info.source_file, None);
}

#[test]
fn rejects_files_that_are_not_class_files() {
    assert_eq!(
        read_class_file(b"PK\x03\x04rest").unwrap_err(),
        ClassFileError::InvalidMagic { found: 0x504B_0304 }
    );
}

#[test]
fn rejects_truncated_class_files() {
    let bytes = class_file("Hello", Some("Hello.gs"));
    assert!(matches!(
        read_class_file(&bytes[..bytes.len() - 3]).unwrap_err(),
        ClassFileError::Truncated { .. }
    ));
}

#[test]
fn rejects_unknown_constant_tags() {
    let mut bytes = class_file("Hello", None);
    // First constant's tag sits right after magic, versions and the count.
    bytes[10] = 99;
    assert_eq!(
        read_class_file(&bytes).unwrap_err(),
        ClassFileError::UnknownConstant { tag: 99, index: 1 }
    );
}
