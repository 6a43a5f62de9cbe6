use std::path::{Path, PathBuf};

use jacoco_import_core::exec::ExecDump;
use jacoco_import_core::exec::reader::decode_exec;
use jacoco_import_core::exec::writer::encode_exec;
use serde::Serialize;

use crate::error::ImportError;

pub fn read_exec_file(path: &Path) -> Result<ExecDump, ImportError> {
    let bytes = std::fs::read(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode_exec(&bytes).map_err(|source| ImportError::ExecDecode {
        path: path.to_path_buf(),
        source,
    })
}

pub fn write_exec_file(path: &Path, dump: &ExecDump) -> Result<(), ImportError> {
    let bytes = encode_exec(dump).map_err(|source| ImportError::ExecEncode {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, bytes).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Merges dumps in the given order. `None` for an empty list.
pub fn merge_exec_files(paths: &[PathBuf]) -> Result<Option<ExecDump>, ImportError> {
    let mut merged: Option<ExecDump> = None;
    for path in paths {
        let dump = read_exec_file(path)?;
        match merged.as_mut() {
            Some(current) => current.merge(dump).map_err(|source| ImportError::ExecMerge {
                path: path.clone(),
                source,
            })?,
            None => merged = Some(dump),
        }
        tracing::debug!(path = %path.display(), "merged execution data");
    }
    Ok(merged)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: String,
    pub start: i64,
    pub dump: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSummary {
    pub id: String,
    pub name: String,
    pub probes: usize,
    pub covered: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecInfo {
    pub path: String,
    pub format: String,
    pub jacoco_releases: &'static str,
    pub sessions: Vec<SessionSummary>,
    pub classes: Vec<ClassSummary>,
}

pub fn exec_info(path: &Path, dump: &ExecDump) -> ExecInfo {
    ExecInfo {
        path: path.display().to_string(),
        format: format!("{:#06x}", dump.format.version()),
        jacoco_releases: dump.format.jacoco_releases(),
        sessions: dump
            .sessions
            .iter()
            .map(|s| SessionSummary {
                id: s.id.clone(),
                start: s.start,
                dump: s.dump,
            })
            .collect(),
        classes: dump
            .classes()
            .map(|c| ClassSummary {
                id: format!("{:016x}", c.id),
                name: c.name.clone(),
                probes: c.probes.len(),
                covered: c.covered_probes(),
            })
            .collect(),
    }
}

pub fn render_exec_info(info: &ExecInfo) -> String {
    let mut out = format!(
        "{}: format {} (JaCoCo {})\n",
        info.path, info.format, info.jacoco_releases
    );
    for session in &info.sessions {
        out.push_str(&format!(
            "  session {} start={} dump={}\n",
            session.id, session.start, session.dump
        ));
    }
    for class in &info.classes {
        out.push_str(&format!(
            "  {} {} {}/{} probes\n",
            class.id, class.name, class.covered, class.probes
        ));
    }
    out
}
