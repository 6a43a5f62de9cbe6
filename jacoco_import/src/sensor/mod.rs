//! The coverage import adapter: execution data in, per-line measures out.

pub mod binding;

use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};

use jacoco_import_core::coverage::accumulate::accumulate_entry;
use jacoco_import_core::coverage::model::{
    CoverageKind, CoverageResult, ExecutionDataEntry, SourceFileDescriptor,
};
use jacoco_import_core::error::{EntryIntegrityError, ExecDecodeError};
use jacoco_import_core::exec::ExecDump;
use jacoco_import_core::exec::reader::decode_exec;
use serde::Serialize;

use crate::analyzer::ClassCoverageAnalyzer;
use crate::config::LanguageConfig;
use crate::error::ImportError;
use crate::locator::{ReportLocator, is_regular_file};
use crate::project::{ProjectFileIndex, top_level_name};
use crate::sink::CoverageSink;

pub use binding::ClassToSourceBinding;


/// Host configuration consulted by the adapter.
pub trait ImportSettings {
    fn should_execute_on_project(&self, test_scope: bool) -> bool;
    fn report_path(&self, kind: CoverageKind) -> Option<String>;
}

/// The kind of files the host is currently analyzing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileScope {
    Main,
    Test,
}

impl FileScope {
    pub fn is_test(self) -> bool {
        matches!(self, Self::Test)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorDescriptor {
    pub name: String,
    pub languages: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Classes recorded in the report.
    pub classes: usize,
    /// Classes whose data made it into a source file's result.
    pub bound: usize,
    /// Classes without a class file or source file of the target language.
    pub unbound: usize,
    /// Classes whose data was dropped as inconsistent.
    pub rejected: usize,
    /// Files handed to the sink.
    pub files: usize,
}

/// Accumulated result for one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCoverage {
    pub source: SourceFileDescriptor,
    pub result: CoverageResult,
}

pub struct CoverageImportAdapter<'a> {
    base_dir: PathBuf,
    language_key: String,
    language_name: String,
    kind: CoverageKind,
    settings: &'a dyn ImportSettings,
    locator: &'a dyn ReportLocator,
    index: &'a dyn ProjectFileIndex,
    analyzer: &'a dyn ClassCoverageAnalyzer,
}

impl<'a> CoverageImportAdapter<'a> {
    pub fn new(
        base_dir: &Path,
        language: &LanguageConfig,
        settings: &'a dyn ImportSettings,
        locator: &'a dyn ReportLocator,
        index: &'a dyn ProjectFileIndex,
        analyzer: &'a dyn ClassCoverageAnalyzer,
    ) -> Self {
        Self {
            base_dir: base_dir.to_path_buf(),
            language_key: language.key.clone(),
            language_name: language.name.clone(),
            kind: CoverageKind::Unit,
            settings,
            locator,
            index,
            analyzer,
        }
    }

    pub fn with_kind(self, kind: CoverageKind) -> Self {
        Self { kind, ..self }
    }

    pub fn kind(&self) -> CoverageKind {
        self.kind
    }

    pub fn name(&self) -> String {
        match self.kind {
            CoverageKind::Unit => format!("{} JaCoCoSensor", self.language_name),
            CoverageKind::Integration => format!("{} JaCoCoItSensor", self.language_name),
        }
    }

    pub fn describe(&self) -> SensorDescriptor {
        SensorDescriptor {
            name: self.name(),
            languages: vec![self.language_key.clone()],
        }
    }

    /// Resolves the configured report anew on every call; `None` unless it
    /// names an existing regular file.
    pub fn report_file(&self) -> Option<PathBuf> {
        let configured = self.settings.report_path(self.kind)?;
        let resolved = self.locator.resolve(&self.base_dir, &configured);
        if is_regular_file(&resolved) {
            Some(resolved)
        } else {
            tracing::info!(
                path = %resolved.display(),
                kind = self.kind.label(),
                "no JaCoCo execution data found"
            );
            None
        }
    }

    pub fn should_run(&self, scope: FileScope) -> bool {
        if self.report_file().is_none() {
            return false;
        }
        let enabled = self.settings.should_execute_on_project(scope.is_test());
        if !enabled {
            tracing::debug!(?scope, sensor = %self, "coverage import disabled for scope");
        }
        enabled
    }

    /// Binds a recorded class to a source file of the target language.
    /// Nested classes are looked up through their top-level class, while the
    /// returned binding carries the nested class's own class file.
    pub fn resolve_binding(&self, class_name: &str) -> Option<ClassToSourceBinding> {
        let top_level = top_level_name(class_name);
        let Some(top_class) = self.index.find_class_file(top_level) else {
            tracing::debug!(class = class_name, "no class file found");
            return None;
        };
        let Some(source) = self.index.source_for_class(&top_class) else {
            tracing::debug!(class = class_name, "no source file found");
            return None;
        };
        if !source.belongs_to(&self.language_key) {
            tracing::debug!(
                class = class_name,
                file = %source.key,
                language = %self.language_key,
                "source file belongs to another language"
            );
            return None;
        }
        let compiled = if top_level == class_name {
            top_class
        } else {
            let Some(nested) = self.index.find_class_file(class_name) else {
                tracing::debug!(class = class_name, "no class file found");
                return None;
            };
            nested
        };
        Some(ClassToSourceBinding {
            class_name: class_name.to_string(),
            compiled,
            source,
        })
    }

    pub fn accumulate(
        &self,
        entry: &ExecutionDataEntry,
        binding: &ClassToSourceBinding,
    ) -> Result<CoverageResult, EntryIntegrityError> {
        accumulate_entry(entry, &binding.source)
    }

    /// Folds every recorded class into per-file results, keyed by file key.
    pub fn collect(&self, dump: &ExecDump) -> (BTreeMap<String, SourceCoverage>, ImportSummary) {
        let mut files: BTreeMap<String, SourceCoverage> = BTreeMap::new();
        let mut summary = ImportSummary {
            classes: dump.class_count(),
            ..ImportSummary::default()
        };

        for class in dump.classes() {
            let Some(binding) = self.resolve_binding(&class.name) else {
                summary.unbound += 1;
                continue;
            };
            if binding.compiled.id != class.id {
                tracing::warn!(
                    class = %class.name,
                    "class does not match with execution data, skipping"
                );
                summary.rejected += 1;
                continue;
            }
            let entry = match self
                .analyzer
                .analyze(dump.format, &binding.compiled, &class.probes)
            {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!(error = %err, "could not analyze class, skipping");
                    summary.rejected += 1;
                    continue;
                }
            };
            let fragment = match self.accumulate(&entry, &binding) {
                Ok(fragment) => fragment,
                Err(err) => {
                    tracing::warn!(error = %err, "dropping inconsistent coverage data");
                    summary.rejected += 1;
                    continue;
                }
            };
            summary.bound += 1;
            files
                .entry(binding.source.key.clone())
                .or_insert_with(|| SourceCoverage {
                    source: binding.source.clone(),
                    result: CoverageResult::default(),
                })
                .result
                .merge(fragment);
        }
        (files, summary)
    }

    /// Emits every non-empty result once; returns how many files were saved.
    pub fn publish(
        &self,
        results: &BTreeMap<String, SourceCoverage>,
        sink: &mut dyn CoverageSink,
    ) -> usize {
        let mut published = 0;
        for (key, coverage) in results.iter().filter(|(_, c)| !c.result.is_empty()) {
            for (line, hits) in &coverage.result.line_hits {
                sink.record_line_hit(key, self.kind, *line, *hits);
            }
            for (line, total) in &coverage.result.branch_totals {
                let covered = coverage.result.branch_covered.get(line).copied().unwrap_or(0);
                sink.record_branch(key, self.kind, *line, *total, covered);
            }
            sink.save(key, self.kind);
            published += 1;
        }
        published
    }

    pub fn execute(
        &self,
        sink: &mut dyn CoverageSink,
    ) -> Result<ImportSummary, ImportError> {
        let Some(report) = self.report_file() else {
            return Ok(ImportSummary::default());
        };
        let bytes = read_report(&report)?;
        let dump = match decode_exec(&bytes) {
            Ok(dump) => dump,
            Err(ExecDecodeError::Empty) => {
                tracing::info!(path = %report.display(), "execution data is empty");
                return Ok(ImportSummary::default());
            }
            Err(err) => {
                tracing::warn!(
                    path = %report.display(),
                    error = %err,
                    "could not decode execution data"
                );
                return Ok(ImportSummary::default());
            }
        };
        tracing::info!(
            path = %report.display(),
            format = %format!("{:#06x}", dump.format.version()),
            jacoco = dump.format.jacoco_releases(),
            classes = dump.class_count(),
            "analysing execution data"
        );

        let (results, mut summary) = self.collect(&dump);
        summary.files = self.publish(&results, sink);
        tracing::info!(
            sensor = %self,
            classes = summary.classes,
            bound = summary.bound,
            unbound = summary.unbound,
            rejected = summary.rejected,
            files = summary.files,
            "coverage import finished"
        );
        Ok(summary)
    }
}

impl fmt::Display for CoverageImportAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// The handle is closed before this returns, whatever the outcome.
fn read_report(path: &Path) -> Result<Vec<u8>, ImportError> {
    let io_error = |source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut file = std::fs::File::open(path).map_err(io_error)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(io_error)?;
    Ok(bytes)
}
