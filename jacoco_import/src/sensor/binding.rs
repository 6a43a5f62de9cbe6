use jacoco_import_core::coverage::model::SourceFileDescriptor;

use crate::project::CompiledClass;

/// A class from the report, tied to the source file its top-level class was
/// compiled from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassToSourceBinding {
    /// Name as recorded, `$` nesting included.
    pub class_name: String,
    /// The class file of `class_name` itself, not of its enclosing class.
    pub compiled: CompiledClass,
    pub source: SourceFileDescriptor,
}

impl ClassToSourceBinding {
    pub fn is_nested(&self) -> bool {
        crate::project::top_level_name(&self.class_name) != self.class_name
    }
}
