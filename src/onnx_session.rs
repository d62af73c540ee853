use anyhow::{anyhow, Context, Result};
use log::Level;
use ort::{
    execution_providers::{CPUExecutionProvider, ExecutionProviderDispatch},
    logging::LogLevel,
    session::Session,
};
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::cache_common;
use crate::color_utils::symbols;

fn ort_level_from_log(level: Level) -> LogLevel {
    match level {
        // ONNX's info output is closer to debug noise
        Level::Trace => LogLevel::Verbose,
        Level::Debug => LogLevel::Warning,
        Level::Info => LogLevel::Error,
        Level::Warn => LogLevel::Error,
        Level::Error => LogLevel::Fatal,
    }
}

/// Configuration for creating ONNX sessions
pub struct SessionConfig<'a> {
    pub device: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub model_path: String,
    pub model_size_bytes: usize,
    pub execution_providers: Vec<String>,
    pub model_checksum: String,
}

/// Device selection result
#[derive(Debug, Clone, Serialize)]
pub struct DeviceSelection {
    pub device: String,
    pub reason: String,
}

/// Resolve the requested device to one this build can run on.
pub fn determine_optimal_device(requested_device: &str) -> DeviceSelection {
    match requested_device {
        "auto" => DeviceSelection {
            device: "cpu".to_string(),
            reason: "Auto-selected CPU".to_string(),
        },
        "cpu" => DeviceSelection {
            device: "cpu".to_string(),
            reason: "User explicitly chose cpu".to_string(),
        },
        other => DeviceSelection {
            device: "cpu".to_string(),
            reason: format!("Device '{other}' not supported, using CPU"),
        },
    }
}

fn execution_providers_for(device: &str) -> Vec<ExecutionProviderDispatch> {
    if device != "cpu" {
        log::warn!(
            "{}Unknown device '{device}', using CPU",
            symbols::warning()
        );
    }
    vec![CPUExecutionProvider::default().build()]
}

/// Load a model file and create an ONNX Runtime session for it.
pub fn create_onnx_session(model_path: &Path, config: &SessionConfig) -> Result<(Session, ModelInfo)> {
    if !model_path.exists() {
        return Err(anyhow!(
            "Model file does not exist: {}",
            model_path.display()
        ));
    }

    let bytes = fs::read(model_path)
        .with_context(|| format!("Failed to read model file {}", model_path.display()))?;
    if bytes.is_empty() {
        return Err(anyhow!(
            "Model file is empty (0 bytes): {}",
            model_path.display()
        ));
    }

    let execution_providers = execution_providers_for(config.device);
    let ep_names: Vec<String> = execution_providers
        .iter()
        .map(|ep| format!("{ep:?}"))
        .collect();

    // Choose the ORT log level based on what is enabled for us
    let ort_log_level = [
        Level::Trace,
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
    ]
    .into_iter()
    .find(|&lvl| log::log_enabled!(lvl))
    .map(ort_level_from_log)
    .unwrap_or(LogLevel::Fatal);

    let session = Session::builder()
        .map_err(|e| anyhow!("Failed to create session builder: {}", e))?
        .with_log_level(ort_log_level)
        .map_err(|e| anyhow!("Failed to set log level: {}", e))?
        .with_execution_providers(execution_providers)
        .map_err(|e| anyhow!("Failed to set execution providers: {}", e))?
        .commit_from_memory(&bytes)
        .map_err(|e| anyhow!("Failed to load model {}: {}", model_path.display(), e))?;

    let model_info = ModelInfo {
        model_path: model_path.display().to_string(),
        model_size_bytes: bytes.len(),
        execution_providers: ep_names,
        model_checksum: cache_common::calculate_md5_bytes(&bytes),
    };

    log::debug!(
        "{} Execution providers registered: {}",
        symbols::system_setup(),
        model_info.execution_providers.join(" -> ")
    );

    Ok((session, model_info))
}
