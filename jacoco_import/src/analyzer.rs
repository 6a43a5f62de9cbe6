use std::collections::HashMap;
use std::path::Path;

use jacoco_import_core::coverage::model::{BranchRecord, ExecutionDataEntry};
use jacoco_import_core::exec::ExecFormat;
use serde::Deserialize;
use thiserror::Error;

use crate::error::ImportError;
use crate::project::CompiledClass;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("no probe layout for {class} in format {format:#06x}")]
    Unavailable { class: String, format: u16 },

    #[error("{class}: layout has {expected} probes, execution data has {found}")]
    ProbeCountMismatch {
        class: String,
        expected: usize,
        found: usize,
    },

    #[error("{class}: probe on line {line} is beyond the last possible line 65535")]
    LineOutOfRange { class: String, line: u32 },
}

/// Class files store line numbers as unsigned 16-bit values.
pub const MAX_LINE: u32 = u16::MAX as u32;

/// Bytecode analysis: turns the probe array recorded for a class into the
/// class's per-line counters. Probe meaning depends on the format revision
/// that recorded them.
pub trait ClassCoverageAnalyzer {
    fn analyze(
        &self,
        format: ExecFormat,
        class: &CompiledClass,
        probes: &[bool],
    ) -> Result<ExecutionDataEntry, AnalysisError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ProbeSite {
    pub line: u32,
    /// The probe marks one outcome of a branching instruction on `line`.
    #[serde(default)]
    pub branch: bool,
}

/// Where each probe of a class sits. Index `i` describes probe `i`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeLayout {
    sites: Vec<ProbeSite>,
}

impl ProbeLayout {
    pub fn new(sites: Vec<ProbeSite>) -> Self {
        Self { sites }
    }

    pub fn line(mut self, line: u32) -> Self {
        self.sites.push(ProbeSite {
            line,
            branch: false,
        });
        self
    }

    pub fn branch(mut self, line: u32) -> Self {
        self.sites.push(ProbeSite { line, branch: true });
        self
    }

    pub fn probe_count(&self) -> usize {
        self.sites.len()
    }

    /// A line counts as executed once when any of its probes fired, and as
    /// executed zero times when it has probes but none fired. Lines without
    /// probes stay absent. Sites on line 0 carry no debug information and
    /// are ignored. Sites past [`MAX_LINE`] reject the whole layout.
    pub fn fold(
        &self,
        class_name: &str,
        probes: &[bool],
    ) -> Result<ExecutionDataEntry, AnalysisError> {
        if probes.len() != self.sites.len() {
            return Err(AnalysisError::ProbeCountMismatch {
                class: class_name.to_string(),
                expected: self.sites.len(),
                found: probes.len(),
            });
        }
        let last_line = self.sites.iter().map(|site| site.line).max().unwrap_or(0);
        if last_line > MAX_LINE {
            return Err(AnalysisError::LineOutOfRange {
                class: class_name.to_string(),
                line: last_line,
            });
        }
        let last_line = last_line as usize;
        let mut entry = ExecutionDataEntry {
            class_name: class_name.to_string(),
            line_hits: vec![None; last_line],
            branches: vec![BranchRecord::default(); last_line],
        };
        for (site, hit) in self.sites.iter().zip(probes) {
            let Some(index) = (site.line as usize).checked_sub(1) else {
                continue;
            };
            let hit = u64::from(*hit);
            let counter = &mut entry.line_hits[index];
            *counter = Some(counter.unwrap_or(0).max(hit));
            if site.branch {
                let record = &mut entry.branches[index];
                record.total += 1;
                record.covered += hit as u32;
            }
        }
        Ok(entry)
    }
}

/// Analyzer backed by layouts computed ahead of time, e.g. by the build
/// that instrumented the classes.
#[derive(Debug, Clone, Default)]
pub struct PrecomputedLayouts {
    layouts: HashMap<(ExecFormat, String), ProbeLayout>,
}

#[derive(Debug, Deserialize)]
struct LayoutFile {
    layouts: Vec<LayoutRecord>,
}

#[derive(Debug, Deserialize)]
struct LayoutRecord {
    format: String,
    class: String,
    sites: Vec<ProbeSite>,
}

impl PrecomputedLayouts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, format: ExecFormat, class_name: &str, layout: ProbeLayout) {
        self.layouts.insert((format, class_name.to_string()), layout);
    }

    pub fn with(mut self, format: ExecFormat, class_name: &str, layout: ProbeLayout) -> Self {
        self.insert(format, class_name, layout);
        self
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }

    pub fn parse_json(text: &str) -> Result<Self, String> {
        let file = serde_json::from_str::<LayoutFile>(text).map_err(|err| err.to_string())?;
        file.layouts
            .into_iter()
            .try_fold(Self::new(), |layouts, record| {
                let format = parse_format(&record.format)
                    .ok_or_else(|| format!("unknown format {:?}", record.format))?;
                Ok(layouts.with(format, &record.class, ProbeLayout::new(record.sites)))
            })
    }

    pub fn load(path: &Path) -> Result<Self, ImportError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ImportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_json(&raw).map_err(|message| ImportError::LayoutParse {
            path: path.to_path_buf(),
            message,
        })
    }
}

impl ClassCoverageAnalyzer for PrecomputedLayouts {
    fn analyze(
        &self,
        format: ExecFormat,
        class: &CompiledClass,
        probes: &[bool],
    ) -> Result<ExecutionDataEntry, AnalysisError> {
        self.layouts
            .get(&(format, class.name.clone()))
            .ok_or_else(|| AnalysisError::Unavailable {
                class: class.name.clone(),
                format: format.version(),
            })?
            .fold(&class.name, probes)
    }
}

fn parse_format(raw: &str) -> Option<ExecFormat> {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    u16::from_str_radix(digits, 16)
        .ok()
        .and_then(ExecFormat::from_version)
}
