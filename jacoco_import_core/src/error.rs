use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecDecodeError {
    #[error("execution data file is empty")]
    Empty,

    #[error("invalid execution data file: bad magic number {found:#06x}")]
    InvalidMagic { found: u16 },

    #[error("unsupported execution data format version {found:#06x}")]
    UnsupportedVersion { found: u16 },

    #[error("invalid execution data file: first block is {block:#04x}, expected a header")]
    MissingHeader { block: u8 },

    #[error("unknown block type {block:#04x} at offset {offset}")]
    UnknownBlock { block: u8, offset: usize },

    #[error("execution data truncated at offset {offset}")]
    Truncated { offset: usize },

    #[error("malformed modified UTF-8 string at offset {offset}")]
    InvalidUtf { offset: usize },

    #[error("malformed variable-length integer at offset {offset}")]
    InvalidLength { offset: usize },

    #[error("header at offset {offset} declares version {found:#06x}, expected {expected:#06x}")]
    MixedVersions {
        offset: usize,
        expected: u16,
        found: u16,
    },

    #[error("different class names {first} and {second} for id {id:016x}")]
    ClassNameConflict {
        id: u64,
        first: String,
        second: String,
    },

    #[error(
        "incompatible execution data for class {name} with id {id:016x}: {expected} probes vs {found}"
    )]
    IncompatibleProbes {
        id: u64,
        name: String,
        expected: usize,
        found: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecMergeError {
    #[error("cannot merge format {found:#06x} into a dump of format {expected:#06x}")]
    FormatMismatch { expected: u16, found: u16 },

    #[error(transparent)]
    Conflict(#[from] ExecDecodeError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecEncodeError {
    #[error("string of {len} bytes exceeds the 65535 byte limit: {preview}")]
    StringTooLong { len: usize, preview: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassFileError {
    #[error("not a class file: bad magic {found:#010x}")]
    InvalidMagic { found: u32 },

    #[error("class file truncated at offset {offset}")]
    Truncated { offset: usize },

    #[error("unknown constant pool tag {tag} at index {index}")]
    UnknownConstant { tag: u8, index: u16 },

    #[error("constant pool index {index} does not refer to a {expected} entry")]
    BadConstantRef { index: u16, expected: &'static str },

    #[error("malformed modified UTF-8 in constant pool entry {index}")]
    InvalidUtf { index: u16 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryIntegrityError {
    #[error("{class}: line {line} reports {covered} covered branches out of {total}")]
    CoveredExceedsTotal {
        class: String,
        line: u32,
        total: u32,
        covered: u32,
    },

    #[error("{class}: line {line} is outside {file} ({lines} lines)")]
    LineOutOfRange {
        class: String,
        file: String,
        line: u32,
        lines: u32,
    },
}
