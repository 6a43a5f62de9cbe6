pub mod analyzer;
pub mod config;
pub mod error;
pub mod exec_files;
pub mod locator;
pub mod logging;
pub mod project;
pub mod sensor;
pub mod sink;


pub use jacoco_import_core::coverage::model::{
    BranchRecord, CoverageKind, CoverageResult, ExecutionDataEntry, SourceFileDescriptor,
};
