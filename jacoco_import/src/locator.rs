use std::path::{Path, PathBuf};

/// Turns a configured report path into a concrete file location.
pub trait ReportLocator {
    fn resolve(&self, base_dir: &Path, report_path: &str) -> PathBuf;
}

/// Absolute paths are taken as-is, relative ones are joined onto the
/// project root.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectRelativeLocator;

impl ReportLocator for ProjectRelativeLocator {
    fn resolve(&self, base_dir: &Path, report_path: &str) -> PathBuf {
        let candidate = Path::new(report_path);
        let joined = if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            base_dir.join(candidate)
        };
        dunce::simplified(&joined).to_path_buf()
    }
}

pub fn is_regular_file(path: &Path) -> bool {
    std::fs::metadata(path).ok().is_some_and(|m| m.is_file())
}
