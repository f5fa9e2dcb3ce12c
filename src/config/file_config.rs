use crate::error::{EtlError, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub input_root: Option<String>,
    pub output_root: Option<String>,
    pub credentials_path: Option<String>,

    // Feature configs
    pub sources: Option<SourcesConfig>,
    pub output: Option<OutputConfig>,
    pub engine: Option<EngineConfig>,
    pub s3: Option<S3Config>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct SourcesConfig {
    /// Glob, relative to the input root, selecting song metadata shards.
    pub song_data: Option<String>,
    /// Glob, relative to the input root, selecting activity log shards.
    pub log_data: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct OutputConfig {
    /// "overwrite" or "error-if-exists"
    pub write_mode: Option<String>,
    /// "snappy", "zstd" or "uncompressed"
    pub compression: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct EngineConfig {
    pub worker_threads: Option<usize>,
    pub io_concurrency: Option<usize>,
    /// "utc" or "local"
    pub timestamp_zone: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct S3Config {
    pub region: Option<String>,
    /// Endpoint override, e.g. a MinIO or LocalStack URL.
    pub endpoint: Option<String>,
    pub force_path_style: Option<bool>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            EtlError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;
        toml::from_str(&content).map_err(|e| {
            EtlError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })
    }
}
