use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CoverageKind {
    Unit,
    Integration,
}

impl CoverageKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Unit => "unit",
            Self::Integration => "integration",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BranchRecord {
    pub total: u32,
    pub covered: u32,
}

/// Per-line view of one compiled class. Index `i` describes line `i + 1`.
/// A `None` counter means the line carries no code, which is not the same
/// as code that never ran (`Some(0)`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionDataEntry {
    pub class_name: String,
    pub line_hits: Vec<Option<u64>>,
    pub branches: Vec<BranchRecord>,
}

impl ExecutionDataEntry {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            line_hits: Vec::new(),
            branches: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFileDescriptor {
    /// Project-relative, `/`-separated.
    pub key: String,
    pub path: PathBuf,
    pub lines: u32,
    pub language: Option<String>,
}

impl SourceFileDescriptor {
    pub fn belongs_to(&self, language_key: &str) -> bool {
        self.language.as_deref() == Some(language_key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CoverageResult {
    pub line_hits: BTreeMap<u32, u64>,
    pub branch_totals: BTreeMap<u32, u32>,
    pub branch_covered: BTreeMap<u32, u32>,
}

impl CoverageResult {
    pub fn is_empty(&self) -> bool {
        self.line_hits.is_empty() && self.branch_totals.is_empty()
    }

    pub fn conditions(&self, line: u32) -> Option<(u32, u32)> {
        let total = self.branch_totals.get(&line).copied()?;
        let covered = self.branch_covered.get(&line).copied().unwrap_or(0);
        Some((total, covered))
    }

    /// Hits add up across fragments; branch data is reported once per line,
    /// so the later fragment wins.
    pub fn merge(&mut self, fragment: CoverageResult) {
        for (line, hits) in fragment.line_hits {
            let previous = self.line_hits.get(&line).copied().unwrap_or(0);
            self.line_hits.insert(line, previous.saturating_add(hits));
        }
        self.branch_totals.extend(fragment.branch_totals);
        self.branch_covered.extend(fragment.branch_covered);
    }

    pub fn lines_covered(&self) -> usize {
        self.line_hits.values().filter(|hits| **hits > 0).count()
    }
}
