//! JaCoCo execution data (`*.exec`) container.
//!
//! A file is a sequence of blocks, each introduced by a one-byte type:
//! a header (magic + format version), session infos, and per-class probe
//! arrays. Dumps appended to an existing file repeat the header.

pub mod crc64;
pub mod reader;
pub mod writer;


use indexmap::IndexMap;

use crate::error::{ExecDecodeError, ExecMergeError};

pub const BLOCK_HEADER: u8 = 0x01;
pub const BLOCK_SESSION_INFO: u8 = 0x10;
pub const BLOCK_EXECUTION_DATA: u8 = 0x11;
pub const MAGIC_NUMBER: u16 = 0xC0C0;

/// The two on-disk revisions we accept. They share the block layout but
/// come from different probe insertion strategies, so probe arrays of one
/// revision only make sense against that revision's analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExecFormat {
    /// JaCoCo 0.7.0 to 0.7.4.
    V1006,
    /// JaCoCo 0.7.5 and later.
    V1007,
}

impl ExecFormat {
    pub fn from_version(version: u16) -> Option<Self> {
        match version {
            0x1006 => Some(Self::V1006),
            0x1007 => Some(Self::V1007),
            _ => None,
        }
    }

    pub fn version(self) -> u16 {
        match self {
            Self::V1006 => 0x1006,
            Self::V1007 => 0x1007,
        }
    }

    pub fn jacoco_releases(self) -> &'static str {
        match self {
            Self::V1006 => "0.7.0 - 0.7.4",
            Self::V1007 => "0.7.5+",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub id: String,
    pub start: i64,
    pub dump: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassExecution {
    pub id: u64,
    /// VM name, e.g. `org/example/Hello$InnerClass`.
    pub name: String,
    pub probes: Vec<bool>,
}

impl ClassExecution {
    pub fn has_hits(&self) -> bool {
        self.probes.iter().any(|probe| *probe)
    }

    pub fn covered_probes(&self) -> usize {
        self.probes.iter().filter(|probe| **probe).count()
    }

    fn merge_probes(&mut self, other: &ClassExecution) -> Result<(), ExecDecodeError> {
        if self.name != other.name {
            return Err(ExecDecodeError::ClassNameConflict {
                id: self.id,
                first: self.name.clone(),
                second: other.name.clone(),
            });
        }
        if self.probes.len() != other.probes.len() {
            return Err(ExecDecodeError::IncompatibleProbes {
                id: self.id,
                name: self.name.clone(),
                expected: self.probes.len(),
                found: other.probes.len(),
            });
        }
        self.probes
            .iter_mut()
            .zip(&other.probes)
            .for_each(|(mine, theirs)| *mine |= *theirs);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecDump {
    pub format: ExecFormat,
    pub sessions: Vec<SessionInfo>,
    classes: IndexMap<u64, ClassExecution>,
}

impl ExecDump {
    pub fn new(format: ExecFormat) -> Self {
        Self {
            format,
            sessions: Vec::new(),
            classes: IndexMap::new(),
        }
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassExecution> {
        self.classes.values()
    }

    pub fn class(&self, id: u64) -> Option<&ClassExecution> {
        self.classes.get(&id)
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Adds a record, OR-ing its probes into an existing record with the
    /// same id. First-seen order is kept.
    pub fn put(&mut self, class: ClassExecution) -> Result<(), ExecDecodeError> {
        match self.classes.get_mut(&class.id) {
            Some(existing) => existing.merge_probes(&class),
            None => {
                self.classes.insert(class.id, class);
                Ok(())
            }
        }
    }

    pub fn merge(&mut self, other: ExecDump) -> Result<(), ExecMergeError> {
        if other.format != self.format {
            return Err(ExecMergeError::FormatMismatch {
                expected: self.format.version(),
                found: other.format.version(),
            });
        }
        self.sessions.extend(other.sessions);
        for class in other.classes.into_values() {
            self.put(class)?;
        }
        Ok(())
    }
}
