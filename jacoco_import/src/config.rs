use std::path::{Path, PathBuf};

use jacoco_import_core::coverage::model::CoverageKind;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::error::ImportError;
use crate::sensor::ImportSettings;

pub const DEFAULT_REPORT_PATH: &str = "target/jacoco.exec";
pub const DEFAULT_IT_REPORT_PATH: &str = "target/jacoco-it.exec";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct LanguageConfig {
    pub key: String,
    pub name: String,
    pub suffixes: Vec<String>,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            key: "gosu".to_string(),
            name: "Gosu".to_string(),
            suffixes: [".gs", ".gsx", ".gst", ".gsp"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl LanguageConfig {
    pub fn matches(&self, path: &Path) -> bool {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        self.suffixes
            .iter()
            .any(|suffix| file_name.ends_with(&suffix.to_ascii_lowercase()))
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ImportConfig {
    pub report_path: Option<String>,
    pub it_report_path: Option<String>,
    pub binary_dirs: Vec<String>,
    pub source_dirs: Vec<String>,
    pub language: LanguageConfig,
    pub execute_on_main: bool,
    pub execute_on_tests: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            report_path: Some(DEFAULT_REPORT_PATH.to_string()),
            it_report_path: Some(DEFAULT_IT_REPORT_PATH.to_string()),
            binary_dirs: vec!["target/classes".to_string()],
            source_dirs: vec!["src/main/gosu".to_string()],
            language: LanguageConfig::default(),
            execute_on_main: true,
            execute_on_tests: false,
        }
    }
}

impl ImportSettings for ImportConfig {
    fn should_execute_on_project(&self, test_scope: bool) -> bool {
        if test_scope {
            self.execute_on_tests
        } else {
            self.execute_on_main
        }
    }

    fn report_path(&self, kind: CoverageKind) -> Option<String> {
        let configured = match kind {
            CoverageKind::Unit => self.report_path.as_deref(),
            CoverageKind::Integration => self.it_report_path.as_deref(),
        };
        configured
            .map(str::trim)
            .filter(|path| !path.is_empty())
            .map(String::from)
    }
}

pub fn discover_config_path(project_root: &Path) -> Option<PathBuf> {
    let names = [
        "jacoco-import.toml",
        "jacoco-import.config.json",
        "jacoco-import.config.json5",
        "jacoco-import.config.yaml",
        "jacoco-import.config.yml",
        ".jacoco-importrc",
        ".jacoco-importrc.json",
        ".jacoco-importrc.yaml",
        ".jacoco-importrc.yml",
    ];
    names
        .into_iter()
        .map(|name| project_root.join(name))
        .find(|p| p.is_file())
}

pub fn load_import_config(project_root: &Path) -> Result<ImportConfig, ImportError> {
    match discover_config_path(project_root) {
        Some(path) => load_import_config_from_path(&path),
        None => Ok(ImportConfig::default()),
    }
}

pub fn load_import_config_from_path(path: &Path) -> Result<ImportConfig, ImportError> {
    let ext = path
        .extension()
        .and_then(|x| x.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "toml" => load_toml_config(path),
        "yaml" | "yml" => load_yaml_config(path),
        _ => load_json_config(path),
    }
}

fn read_config_text(path: &Path) -> Result<String, ImportError> {
    std::fs::read_to_string(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn load_json_config(path: &Path) -> Result<ImportConfig, ImportError> {
    let raw = read_config_text(path)?;
    json5::from_str::<ImportConfig>(&raw)
        .or_else(|_| serde_json::from_str::<ImportConfig>(&raw))
        .map_err(|err| ImportError::ConfigParse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
}

fn load_yaml_config(path: &Path) -> Result<ImportConfig, ImportError> {
    let raw = read_config_text(path)?;
    serde_yaml::from_str::<ImportConfig>(&raw).map_err(|err| ImportError::ConfigParse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

fn load_toml_config(path: &Path) -> Result<ImportConfig, ImportError> {
    let raw = read_config_text(path)?;
    let toml_value =
        toml::from_str::<toml::Value>(&raw).map_err(|err| ImportError::ConfigParse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
    let json_value =
        serde_json::to_value(toml_value).map_err(|err| ImportError::ConfigParse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
    let normalized = normalize_toml_keys_to_camel_case(&json_value);

    serde_json::from_value::<ImportConfig>(normalized).map_err(|err| ImportError::ConfigParse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

fn normalize_toml_keys_to_camel_case(value: &JsonValue) -> JsonValue {
    match value {
        JsonValue::Object(object) => JsonValue::Object(
            object
                .iter()
                .map(|(key, value)| {
                    (
                        normalize_toml_key(key),
                        normalize_toml_keys_to_camel_case(value),
                    )
                })
                .collect(),
        ),
        JsonValue::Array(array) => JsonValue::Array(
            array
                .iter()
                .map(normalize_toml_keys_to_camel_case)
                .collect(),
        ),
        other => other.clone(),
    }
}

fn normalize_toml_key(key: &str) -> String {
    if !key.contains('_') {
        return key.to_string();
    }

    let mut segments = key.split('_').filter(|segment| !segment.is_empty());
    let Some(first_segment) = segments.next() else {
        return key.to_string();
    };

    let mut normalized_key = String::from(first_segment);
    for segment in segments {
        let mut chars = segment.chars();
        let Some(first_char) = chars.next() else {
            continue;
        };
        normalized_key.push(first_char.to_ascii_uppercase());
        normalized_key.extend(chars);
    }
    normalized_key
}
