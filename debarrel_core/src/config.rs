use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::error::DebarrelError;

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DebarrelConfig {
    /// Barrel packages whose imports get rewritten.
    #[serde(default)]
    pub packages: Vec<String>,
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    pub source_map: Option<bool>,
    pub out_dir: Option<String>,
    pub root_dir: Option<String>,
    pub condition_names: Option<Vec<String>>,
    pub main_fields: Option<Vec<String>>,
}

pub fn discover_config_path(project_root: &Path) -> Option<PathBuf> {
    let names = [
        "debarrel.toml",
        "debarrel.config.json",
        "debarrel.config.json5",
        "debarrel.config.jsonc",
        "debarrel.config.yaml",
        "debarrel.config.yml",
        ".debarrelrc",
        ".debarrelrc.json",
        ".debarrelrc.json5",
        ".debarrelrc.yaml",
        ".debarrelrc.yml",
    ];
    names
        .into_iter()
        .map(|name| project_root.join(name))
        .find(|p| p.exists())
}

/// Loads the project's configuration: a dedicated config file when one exists,
/// otherwise the `"debarrel"` key of `package.json`, otherwise defaults.
pub fn load_debarrel_config(project_root: &Path) -> Result<DebarrelConfig, DebarrelError> {
    if let Some(path) = discover_config_path(project_root) {
        return load_debarrel_config_from_path(&path);
    }
    load_package_json_config(project_root)
}

pub fn load_debarrel_config_from_path(path: &Path) -> Result<DebarrelConfig, DebarrelError> {
    let ext = path
        .extension()
        .and_then(|x| x.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "yaml" | "yml" => load_yaml_config(path),
        "toml" => load_toml_config(path),
        _ => load_json_config(path),
    }
}

fn read_config_text(path: &Path) -> Result<String, DebarrelError> {
    std::fs::read_to_string(path).map_err(|source| DebarrelError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn load_json_config(path: &Path) -> Result<DebarrelConfig, DebarrelError> {
    let raw = read_config_text(path)?;
    json5::from_str::<DebarrelConfig>(&raw)
        .or_else(|_| serde_json::from_str::<DebarrelConfig>(&raw))
        .map_err(|err| DebarrelError::ConfigParse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
}

fn load_yaml_config(path: &Path) -> Result<DebarrelConfig, DebarrelError> {
    let raw = read_config_text(path)?;
    serde_yaml::from_str::<DebarrelConfig>(&raw).map_err(|err| DebarrelError::ConfigParse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

fn load_toml_config(path: &Path) -> Result<DebarrelConfig, DebarrelError> {
    let raw = read_config_text(path)?;
    let toml_value =
        toml::from_str::<toml::Value>(&raw).map_err(|err| DebarrelError::ConfigParse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
    let json_value =
        serde_json::to_value(toml_value).map_err(|err| DebarrelError::ConfigParse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
    serde_json::from_value::<DebarrelConfig>(normalize_toml_keys_to_camel_case(&json_value))
        .map_err(|err| DebarrelError::ConfigParse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
}

fn load_package_json_config(project_root: &Path) -> Result<DebarrelConfig, DebarrelError> {
    let path = project_root.join("package.json");
    if !path.exists() {
        return Ok(DebarrelConfig::default());
    }
    let raw = read_config_text(&path)?;
    let manifest =
        serde_json::from_str::<JsonValue>(&raw).map_err(|err| DebarrelError::ConfigParse {
            path: path.clone(),
            message: err.to_string(),
        })?;
    let Some(section) = manifest.get("debarrel").cloned() else {
        return Ok(DebarrelConfig::default());
    };
    serde_json::from_value::<DebarrelConfig>(section).map_err(|err| DebarrelError::ConfigParse {
        path,
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
