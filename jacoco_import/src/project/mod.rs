pub mod fs_index;


use std::path::PathBuf;

use jacoco_import_core::coverage::model::SourceFileDescriptor;

pub use fs_index::FsProjectIndex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledClass {
    /// VM name, `/`-separated, possibly with `$` nesting.
    pub name: String,
    pub path: PathBuf,
    /// CRC64 of the class file bytes.
    pub id: u64,
}

/// The project's view of compiled classes and analyzed source files.
pub trait ProjectFileIndex {
    fn find_class_file(&self, class_name: &str) -> Option<CompiledClass>;
    fn source_for_class(&self, class: &CompiledClass) -> Option<SourceFileDescriptor>;
}

/// `org/a/Hello$Inner$1` -> `org/a/Hello`. Only the simple name is cut, a
/// `$` inside a package segment is left alone.
pub fn top_level_name(class_name: &str) -> &str {
    let simple_start = class_name.rfind('/').map_or(0, |slash| slash + 1);
    match class_name[simple_start..].find('$') {
        Some(dollar) if dollar > 0 => &class_name[..simple_start + dollar],
        _ => class_name,
    }
}

pub fn package_of(class_name: &str) -> &str {
    class_name.rsplit_once('/').map_or("", |(package, _)| package)
}
