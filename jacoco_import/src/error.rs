use std::path::PathBuf;

use jacoco_import_core::error::{ExecDecodeError, ExecEncodeError, ExecMergeError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("failed to read execution data {path}: {source}")]
    ExecDecode {
        path: PathBuf,
        #[source]
        source: ExecDecodeError,
    },

    #[error("failed to merge execution data {path}: {source}")]
    ExecMerge {
        path: PathBuf,
        #[source]
        source: ExecMergeError,
    },

    #[error("failed to write execution data {path}: {source}")]
    ExecEncode {
        path: PathBuf,
        #[source]
        source: ExecEncodeError,
    },

    #[error("failed to parse probe layouts at {path}: {message}")]
    LayoutParse { path: PathBuf, message: String },
}
