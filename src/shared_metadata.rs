use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Sidecar metadata describing how a response was produced.
#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct RunMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution: Option<ExecutionContext>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<SystemInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<toml::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<RunSummary>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ExecutionContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aquatherm_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_line: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_processing_time_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aquatherm_env_vars: Option<HashMap<String, String>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct SystemInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_requested: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_selected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_selection_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_size_bytes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_checksum: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_load_time_ms: Option<f64>,
}

/// Headline numbers of the run, for quick inspection without the response.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub object_count: usize,
    pub urban_risk_index: f64,
    pub intervention_count: usize,
    pub confidence_score: f64,
    pub image_source: String,
}

/// Save metadata to a TOML file, creating parent directories as needed
pub fn save_metadata(metadata: &RunMetadata, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let toml_content = toml::to_string_pretty(metadata).map_err(|e| {
        anyhow::anyhow!(
            "Failed to serialize metadata to TOML: {}. This usually means a field contains a value that cannot be represented in TOML format.",
            e
        )
    })?;

    fs::write(path, toml_content)?;
    Ok(())
}

/// Metadata sidecar path: next to the written response if any, else next to
/// the input image, else in the current directory named after the region.
pub fn get_metadata_path(output: Option<&Path>, image: Option<&Path>, lat: f64, lng: f64) -> PathBuf {
    let anchor = output.or(image);
    match anchor {
        Some(path) => {
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("analysis");
            path.parent()
                .unwrap_or(Path::new("."))
                .join(format!("{stem}.aquatherm.toml"))
        }
        None => PathBuf::from(format!("satellite_{lat:.4}_{lng:.4}.aquatherm.toml")),
    }
}

/// Collect all AQUATHERM_* environment variables that are present and non-empty
pub fn collect_aquatherm_env_vars() -> Option<HashMap<String, String>> {
    let vars: HashMap<String, String> = std::env::vars()
        .filter(|(key, value)| key.starts_with("AQUATHERM_") && !value.is_empty())
        .collect();

    if vars.is_empty() {
        None
    } else {
        Some(vars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    #[test]
    fn test_toml_structure() {
        let metadata = RunMetadata {
            execution: Some(ExecutionContext {
                timestamp: Some(Utc::now()),
                aquatherm_version: Some("0.1.0".to_string()),
                command_line: Some(vec!["aquatherm".to_string(), "analyze".to_string()]),
                exit_code: Some(0),
                total_processing_time_ms: Some(12.5),
                aquatherm_env_vars: None,
            }),
            system: Some(SystemInfo {
                device_requested: Some("auto".to_string()),
                device_selected: Some("cpu".to_string()),
                ..Default::default()
            }),
            config: None,
            summary: Some(RunSummary {
                object_count: 3,
                urban_risk_index: 5.9,
                intervention_count: 1,
                confidence_score: 0.77,
                image_source: "upload".to_string(),
            }),
        };

        let toml_output = toml::to_string_pretty(&metadata).unwrap();
        assert!(toml_output.contains("[execution]"));
        assert!(toml_output.contains("[system]"));
        assert!(toml_output.contains("[summary]"));
        assert!(toml_output.contains("device_selected = \"cpu\""));
        assert!(!toml_output.contains("model_checksum"));
    }

    #[test]
    fn test_save_metadata_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("run.aquatherm.toml");
        let metadata = RunMetadata {
            summary: Some(RunSummary {
                object_count: 1,
                urban_risk_index: 2.0,
                intervention_count: 0,
                confidence_score: 0.6,
                image_source: "satellite".to_string(),
            }),
            ..Default::default()
        };
        save_metadata(&metadata, &path).unwrap();

        let loaded: RunMetadata = toml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.summary, metadata.summary);
    }

    #[test]
    fn test_get_metadata_path() {
        assert_eq!(
            get_metadata_path(Some(Path::new("out/resp.json")), Some(Path::new("img/a.png")), 0.0, 0.0),
            PathBuf::from("out/resp.aquatherm.toml")
        );
        assert_eq!(
            get_metadata_path(None, Some(Path::new("img/a.png")), 0.0, 0.0),
            PathBuf::from("img/a.aquatherm.toml")
        );
        assert_eq!(
            get_metadata_path(None, None, 19.07, 72.87),
            PathBuf::from("satellite_19.0700_72.8700.aquatherm.toml")
        );
    }

    #[test]
    #[serial]
    fn test_collect_aquatherm_env_vars() {
        std::env::set_var("AQUATHERM_TEST_VAR1", "value1");
        std::env::set_var("AQUATHERM_EMPTY_VAR", "");

        let result = collect_aquatherm_env_vars().unwrap();
        assert_eq!(result.get("AQUATHERM_TEST_VAR1"), Some(&"value1".to_string()));
        assert!(!result.contains_key("AQUATHERM_EMPTY_VAR"));

        std::env::remove_var("AQUATHERM_TEST_VAR1");
        std::env::remove_var("AQUATHERM_EMPTY_VAR");
    }
}
