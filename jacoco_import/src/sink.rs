use std::collections::BTreeMap;

use jacoco_import_core::coverage::model::CoverageKind;
use serde::Serialize;

/// The host's coverage reporting surface.
pub trait CoverageSink {
    fn record_line_hit(&mut self, file_key: &str, kind: CoverageKind, line: u32, hits: u64);

    fn record_branch(
        &mut self,
        file_key: &str,
        kind: CoverageKind,
        line: u32,
        total: u32,
        covered: u32,
    );

    /// Called once per file after all its measures were recorded.
    fn save(&mut self, _file_key: &str, _kind: CoverageKind) {}
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct FileMeasures {
    line_hits: BTreeMap<u32, u64>,
    branches: BTreeMap<u32, (u32, u32)>,
    saves: u32,
}

/// Sink that keeps every measure in memory, for the CLI and for tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCoverageSink {
    files: BTreeMap<(CoverageKind, String), FileMeasures>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchMeasure {
    pub line: u32,
    pub total: u32,
    pub covered: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMeasuresReport {
    pub file: String,
    pub kind: &'static str,
    pub lines_total: usize,
    pub lines_covered: usize,
    pub line_hits: BTreeMap<u32, u64>,
    pub branches: Vec<BranchMeasure>,
}

impl InMemoryCoverageSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn measures(&self, file_key: &str, kind: CoverageKind) -> Option<&FileMeasures> {
        self.files.get(&(kind, file_key.to_string()))
    }

    pub fn line_hits(&self, file_key: &str, kind: CoverageKind, line: u32) -> Option<u64> {
        self.measures(file_key, kind)?.line_hits.get(&line).copied()
    }

    pub fn conditions(&self, file_key: &str, kind: CoverageKind, line: u32) -> Option<u32> {
        self.measures(file_key, kind)?
            .branches
            .get(&line)
            .map(|(total, _)| *total)
    }

    pub fn covered_conditions(
        &self,
        file_key: &str,
        kind: CoverageKind,
        line: u32,
    ) -> Option<u32> {
        self.measures(file_key, kind)?
            .branches
            .get(&line)
            .map(|(_, covered)| *covered)
    }

    pub fn saves(&self, file_key: &str, kind: CoverageKind) -> u32 {
        self.measures(file_key, kind).map_or(0, |m| m.saves)
    }

    pub fn file_keys(&self, kind: CoverageKind) -> Vec<String> {
        self.files
            .keys()
            .filter(|(k, _)| *k == kind)
            .map(|(_, key)| key.clone())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn report(&self) -> Vec<FileMeasuresReport> {
        self.files
            .iter()
            .map(|((kind, file), measures)| FileMeasuresReport {
                file: file.clone(),
                kind: kind.label(),
                lines_total: measures.line_hits.len(),
                lines_covered: measures.line_hits.values().filter(|h| **h > 0).count(),
                line_hits: measures.line_hits.clone(),
                branches: measures
                    .branches
                    .iter()
                    .map(|(line, (total, covered))| BranchMeasure {
                        line: *line,
                        total: *total,
                        covered: *covered,
                    })
                    .collect(),
            })
            .collect()
    }
}

impl CoverageSink for InMemoryCoverageSink {
    fn record_line_hit(&mut self, file_key: &str, kind: CoverageKind, line: u32, hits: u64) {
        self.files
            .entry((kind, file_key.to_string()))
            .or_default()
            .line_hits
            .insert(line, hits);
    }

    fn record_branch(
        &mut self,
        file_key: &str,
        kind: CoverageKind,
        line: u32,
        total: u32,
        covered: u32,
    ) {
        self.files
            .entry((kind, file_key.to_string()))
            .or_default()
            .branches
            .insert(line, (total, covered));
    }

    fn save(&mut self, file_key: &str, kind: CoverageKind) {
        self.files
            .entry((kind, file_key.to_string()))
            .or_default()
            .saves += 1;
    }
}

/// One block per file: a summary line, then uncovered lines and partially
/// covered branches.
pub fn render_measures(reports: &[FileMeasuresReport]) -> String {
    let mut out = String::new();
    for report in reports {
        out.push_str(&format!(
            "{} [{}] lines {}/{}\n",
            report.file, report.kind, report.lines_covered, report.lines_total
        ));
        let uncovered = report
            .line_hits
            .iter()
            .filter(|(_, hits)| **hits == 0)
            .map(|(line, _)| line.to_string())
            .collect::<Vec<_>>();
        if !uncovered.is_empty() {
            out.push_str(&format!("  uncovered: {}\n", uncovered.join(",")));
        }
        for branch in report.branches.iter().filter(|b| b.covered < b.total) {
            out.push_str(&format!(
                "  line {}: {}/{} branches\n",
                branch.line, branch.covered, branch.total
            ));
        }
    }
    out
}
