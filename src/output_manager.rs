//! Where responses and metadata sidecars are written.

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::shared_metadata::{get_metadata_path, save_metadata, RunMetadata};

pub struct OutputManager {
    output: Option<PathBuf>,
    metadata_path: PathBuf,
}

impl OutputManager {
    pub fn new(output: Option<&Path>, image: Option<&Path>, lat: f64, lng: f64) -> Self {
        Self {
            output: output.map(Path::to_path_buf),
            metadata_path: get_metadata_path(output, image, lat, lng),
        }
    }

    pub fn metadata_path(&self) -> &Path {
        &self.metadata_path
    }

    /// Pretty-print `value` as JSON to the output file, or to `stdout`.
    pub fn write_json<T: Serialize, W: Write>(&self, value: &T, stdout: &mut W) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        match &self.output {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
                std::fs::write(path, format!("{json}\n"))
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                log::info!("Response written to {}", path.display());
            }
            None => writeln!(stdout, "{json}")?,
        }
        Ok(())
    }

    pub fn save_metadata(&self, metadata: &RunMetadata) -> Result<()> {
        save_metadata(metadata, &self.metadata_path)?;
        log::debug!("Metadata saved to {}", self.metadata_path.display());
        Ok(())
    }
}
