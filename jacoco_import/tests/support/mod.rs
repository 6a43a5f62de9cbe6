#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use jacoco_import::CoverageKind;
use jacoco_import::SourceFileDescriptor;
use jacoco_import::analyzer::{PrecomputedLayouts, ProbeLayout};
use jacoco_import::config::{ImportConfig, LanguageConfig};
use jacoco_import::locator::ReportLocator;
use jacoco_import::project::{CompiledClass, ProjectFileIndex, top_level_name};
use jacoco_import::sensor::ImportSettings;
use jacoco_import_core::exec::crc64::class_id;
use jacoco_import_core::exec::writer::encode_exec;
use jacoco_import_core::exec::{ClassExecution, ExecDump, ExecFormat, SessionInfo};
use tempfile::TempDir;

pub const HELLO: &str = "Hello";
pub const INNER: &str = "Hello$InnerClass";
pub const HELLO_KEY: &str = "example/Hello.groovy";

pub fn write_file(path: &Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}

pub fn numbered_lines(count: u32) -> String {
    (1..=count)
        .map(|n| format!("// line {n}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A minimal but valid class file: constant pool, `this_class`, and an
/// optional `SourceFile` attribute.
pub fn class_file(internal_name: &str, source_file: Option<&str>) -> Vec<u8> {
    let mut pool: Vec<Vec<u8>> = vec![utf8_constant(internal_name), vec![7, 0, 1]];
    if let Some(source) = source_file {
        pool.push(utf8_constant("SourceFile"));
        pool.push(utf8_constant(source));
    }
    let slot_count = pool.len() as u16 + 1;

    let mut out = vec![0xCA, 0xFE, 0xBA, 0xBE, 0x00, 0x00, 0x00, 0x34];
    out.extend_from_slice(&slot_count.to_be_bytes());
    pool.iter().for_each(|entry| out.extend_from_slice(entry));
    out.extend_from_slice(&[0x00, 0x21, 0x00, 0x02, 0x00, 0x00]);
    out.extend_from_slice(&[0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
    if source_file.is_some() {
        out.extend_from_slice(&[0x00, 0x01, 0x00, 0x03, 0x00, 0x00, 0x00, 0x02, 0x00, 0x04]);
    } else {
        out.extend_from_slice(&[0x00, 0x00]);
    }
    out
}

fn utf8_constant(text: &str) -> Vec<u8> {
    let mut entry = vec![1];
    entry.extend_from_slice(&(text.len() as u16).to_be_bytes());
    entry.extend_from_slice(text.as_bytes());
    entry
}

/// `Hello.groovy` (50 lines) compiled to `Hello` and `Hello$InnerClass`
/// under `classes/`.
pub struct SampleProject {
    pub dir: TempDir,
    pub config: ImportConfig,
    pub hello_id: u64,
    pub inner_id: u64,
}

impl SampleProject {
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn exec_path(&self) -> PathBuf {
        self.root().join("ut.exec")
    }

    /// Writes `ut.exec` as recorded by the given format and returns its path.
    pub fn write_exec(&self, format: ExecFormat) -> PathBuf {
        let path = self.exec_path();
        write_file(
            &path,
            &sample_exec(format, self.hello_id, self.inner_id),
        );
        path
    }
}

pub fn sample_project() -> SampleProject {
    let dir = TempDir::new().unwrap();
    write_file(
        &dir.path().join(HELLO_KEY),
        numbered_lines(50).as_bytes(),
    );
    let hello = class_file(HELLO, Some("Hello.groovy"));
    let inner = class_file(INNER, Some("Hello.groovy"));
    write_file(&dir.path().join("classes/Hello.class"), &hello);
    write_file(&dir.path().join("classes/Hello$InnerClass.class"), &inner);

    let config = ImportConfig {
        report_path: Some("ut.exec".to_string()),
        binary_dirs: vec!["classes".to_string()],
        source_dirs: vec!["example".to_string()],
        language: LanguageConfig {
            key: "gosu".to_string(),
            name: "Gosu".to_string(),
            suffixes: vec![".gs".to_string(), ".groovy".to_string()],
        },
        ..ImportConfig::default()
    };
    SampleProject {
        dir,
        config,
        hello_id: class_id(&hello),
        inner_id: class_id(&inner),
    }
}

const HELLO_SITES: [(u32, bool); 14] = [
    (9, false),
    (10, false),
    (14, true),
    (14, true),
    (15, false),
    (17, false),
    (21, false),
    (25, false),
    (29, true),
    (29, true),
    (30, true),
    (30, true),
    (32, false),
    (33, false),
];
const HELLO_PROBES: [bool; 14] = [
    true, true, true, true, true, true, true, false, true, false, false, false, true, true,
];
const INNER_SITES: [(u32, bool); 3] = [(38, false), (42, false), (47, false)];
const INNER_PROBES: [bool; 3] = [false, true, true];

/// Probe order is reversed for 0x1006 only to give the two formats
/// different layouts; results must depend on each format's analyzer alone.
fn ordered<T: Copy>(format: ExecFormat, items: &[T]) -> Vec<T> {
    match format {
        ExecFormat::V1007 => items.to_vec(),
        ExecFormat::V1006 => items.iter().rev().copied().collect(),
    }
}

fn layout(format: ExecFormat, sites: &[(u32, bool)]) -> ProbeLayout {
    ordered(format, sites)
        .into_iter()
        .fold(ProbeLayout::default(), |layout, (line, branch)| {
            if branch {
                layout.branch(line)
            } else {
                layout.line(line)
            }
        })
}

pub fn sample_layouts() -> PrecomputedLayouts {
    [ExecFormat::V1006, ExecFormat::V1007]
        .into_iter()
        .fold(PrecomputedLayouts::new(), |layouts, format| {
            layouts
                .with(format, HELLO, layout(format, &HELLO_SITES))
                .with(format, INNER, layout(format, &INNER_SITES))
        })
}

pub fn sample_dump(format: ExecFormat, hello_id: u64, inner_id: u64) -> ExecDump {
    let mut dump = ExecDump::new(format);
    dump.sessions.push(SessionInfo {
        id: "build-agent".to_string(),
        start: 1_500_000_000_000,
        dump: 1_500_000_004_000,
    });
    dump.put(ClassExecution {
        id: hello_id,
        name: HELLO.to_string(),
        probes: ordered(format, &HELLO_PROBES),
    })
    .unwrap();
    dump.put(ClassExecution {
        id: inner_id,
        name: INNER.to_string(),
        probes: ordered(format, &INNER_PROBES),
    })
    .unwrap();
    dump
}

pub fn sample_exec(format: ExecFormat, hello_id: u64, inner_id: u64) -> Vec<u8> {
    encode_exec(&sample_dump(format, hello_id, inner_id)).unwrap()
}

pub struct StaticSettings {
    pub on_main: bool,
    pub on_tests: bool,
    pub report_path: Option<String>,
}

impl StaticSettings {
    pub fn tests_only(report_path: &str) -> Self {
        Self {
            on_main: false,
            on_tests: true,
            report_path: Some(report_path.to_string()),
        }
    }
}

impl ImportSettings for StaticSettings {
    fn should_execute_on_project(&self, test_scope: bool) -> bool {
        if test_scope { self.on_tests } else { self.on_main }
    }

    fn report_path(&self, _kind: CoverageKind) -> Option<String> {
        self.report_path.clone()
    }
}

/// Resolves every report path to whatever it currently points at.
pub struct SwitchableLocator {
    target: RefCell<PathBuf>,
}

impl SwitchableLocator {
    pub fn new(target: &Path) -> Self {
        Self {
            target: RefCell::new(target.to_path_buf()),
        }
    }

    pub fn point_to(&self, target: &Path) {
        *self.target.borrow_mut() = target.to_path_buf();
    }
}

impl ReportLocator for SwitchableLocator {
    fn resolve(&self, _base_dir: &Path, _report_path: &str) -> PathBuf {
        self.target.borrow().clone()
    }
}

/// Index with classes and sources registered by hand. Sources are keyed
/// by top-level class name.
#[derive(Default)]
pub struct MapIndex {
    classes: HashMap<String, CompiledClass>,
    sources: HashMap<String, SourceFileDescriptor>,
}

impl MapIndex {
    pub fn class(mut self, name: &str, id: u64) -> Self {
        self.classes.insert(
            name.to_string(),
            CompiledClass {
                name: name.to_string(),
                path: PathBuf::from(format!("classes/{name}.class")),
                id,
            },
        );
        self
    }

    pub fn source(mut self, top_level: &str, key: &str, lines: u32, language: &str) -> Self {
        self.sources.insert(
            top_level.to_string(),
            SourceFileDescriptor {
                key: key.to_string(),
                path: PathBuf::from(key),
                lines,
                language: Some(language.to_string()),
            },
        );
        self
    }
}

impl ProjectFileIndex for MapIndex {
    fn find_class_file(&self, class_name: &str) -> Option<CompiledClass> {
        self.classes.get(class_name).cloned()
    }

    fn source_for_class(&self, class: &CompiledClass) -> Option<SourceFileDescriptor> {
        self.sources.get(top_level_name(&class.name)).cloned()
    }
}
