use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use jacoco_import_core::classfile::read_class_file;
use jacoco_import_core::coverage::model::SourceFileDescriptor;
use jacoco_import_core::exec::crc64::class_id;
use path_slash::PathExt;

use crate::config::{ImportConfig, LanguageConfig};
use crate::project::{CompiledClass, ProjectFileIndex, package_of, top_level_name};

/// Index built from the configured source and binary directories.
///
/// Sources are keyed by their path below the source directory that holds
/// them (`org/example/Hello.gs`), which is what a class's package plus its
/// `SourceFile` attribute produce.
#[derive(Debug, Clone)]
pub struct FsProjectIndex {
    binary_dirs: Vec<PathBuf>,
    language: LanguageConfig,
    sources: BTreeMap<String, SourceFileDescriptor>,
}

impl FsProjectIndex {
    pub fn scan(base_dir: &Path, config: &ImportConfig) -> Self {
        let binary_dirs = config
            .binary_dirs
            .iter()
            .map(|dir| base_dir.join(dir))
            .collect::<Vec<_>>();
        let mut sources = BTreeMap::new();
        for source_dir in config.source_dirs.iter().map(|dir| base_dir.join(dir)) {
            for (relative, descriptor) in scan_source_dir(base_dir, &source_dir, &config.language) {
                sources.entry(relative).or_insert(descriptor);
            }
        }
        tracing::debug!(
            sources = sources.len(),
            binary_dirs = binary_dirs.len(),
            "indexed project files"
        );
        Self {
            binary_dirs,
            language: config.language.clone(),
            sources,
        }
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    pub fn sources(&self) -> impl Iterator<Item = &SourceFileDescriptor> {
        self.sources.values()
    }

    fn source_candidates(&self, class: &CompiledClass) -> Vec<String> {
        let package = package_of(&class.name);
        let declared = std::fs::read(&class.path)
            .ok()
            .and_then(|bytes| read_class_file(&bytes).ok())
            .and_then(|info| info.source_file);
        match declared {
            Some(source_file) => vec![join_package(package, &source_file)],
            None => {
                let top_level = top_level_name(&class.name);
                let simple = top_level.rsplit('/').next().unwrap_or(top_level);
                self.language
                    .suffixes
                    .iter()
                    .map(|suffix| join_package(package, &format!("{simple}{suffix}")))
                    .collect()
            }
        }
    }
}

impl ProjectFileIndex for FsProjectIndex {
    fn find_class_file(&self, class_name: &str) -> Option<CompiledClass> {
        self.binary_dirs.iter().find_map(|dir| {
            let path = dir.join(format!("{class_name}.class"));
            let bytes = std::fs::read(&path).ok()?;
            Some(CompiledClass {
                name: class_name.to_string(),
                id: class_id(&bytes),
                path,
            })
        })
    }

    fn source_for_class(&self, class: &CompiledClass) -> Option<SourceFileDescriptor> {
        self.source_candidates(class)
            .iter()
            .find_map(|candidate| self.sources.get(candidate).cloned())
    }
}

fn scan_source_dir(
    base_dir: &Path,
    source_dir: &Path,
    language: &LanguageConfig,
) -> Vec<(String, SourceFileDescriptor)> {
    if !source_dir.is_dir() {
        tracing::debug!(dir = %source_dir.display(), "source directory does not exist");
        return Vec::new();
    }
    let walk = WalkBuilder::new(source_dir)
        .hidden(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .build();
    readable_entries(walk, source_dir)
        .filter(|dent| dent.file_type().is_some_and(|t| t.is_file()))
        .filter_map(|dent| {
            let path = dent.into_path();
            let relative = path.strip_prefix(source_dir).ok()?.to_slash_lossy().to_string();
            let key = path
                .strip_prefix(base_dir)
                .unwrap_or(&path)
                .to_slash_lossy()
                .to_string();
            let bytes = std::fs::read(&path).ok()?;
            let descriptor = SourceFileDescriptor {
                key,
                lines: count_lines(&bytes),
                language: language.matches(&path).then(|| language.key.clone()),
                path,
            };
            Some((relative, descriptor))
        })
        .collect()
}

/// Walk errors (e.g. an unreadable subdirectory) skip that entry only.
pub(crate) fn readable_entries<'a, T: 'a>(
    walk: impl Iterator<Item = Result<T, ignore::Error>> + 'a,
    source_dir: &'a Path,
) -> impl Iterator<Item = T> + 'a {
    walk.filter_map(move |entry| match entry {
        Ok(dent) => Some(dent),
        Err(err) => {
            tracing::warn!(
                dir = %source_dir.display(),
                error = %err,
                "skipping unreadable source entry"
            );
            None
        }
    })
}

/// A trailing newline opens one more (empty) line, as editors number them.
fn count_lines(bytes: &[u8]) -> u32 {
    let newlines = bytes.iter().filter(|byte| **byte == b'\n').count();
    u32::try_from(newlines + 1).unwrap_or(u32::MAX)
}

fn join_package(package: &str, file_name: &str) -> String {
    if package.is_empty() {
        file_name.to_string()
    } else {
        format!("{package}/{file_name}")
    }
}
