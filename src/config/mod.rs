mod credentials;
mod file_config;

pub use credentials::Credentials;
pub use file_config::{EngineConfig, FileConfig, OutputConfig, S3Config, SourcesConfig};

use crate::engine::{parse_option, Compression, EngineOptions, TimestampZone, WriteMode};
use crate::error::{EtlError, Result};
use crate::storage::DataRoot;
use clap::ValueEnum;
use std::path::PathBuf;

pub const DEFAULT_INPUT_ROOT: &str = "s3a://udacity-dend/";
pub const DEFAULT_OUTPUT_ROOT: &str = "s3a://data-lake-project/";
pub const DEFAULT_CREDENTIALS_PATH: &str = "dl.cfg";
pub const DEFAULT_SONG_DATA_GLOB: &str = "song_data/A/A/*/";
pub const DEFAULT_LOG_DATA_GLOB: &str = "log_data/*/*/*";
pub const DEFAULT_S3_REGION: &str = "us-west-2";

/// CLI arguments that can be used for config resolution.
/// Every field is optional: a bare invocation runs the job with defaults.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub input_root: Option<String>,
    pub output_root: Option<String>,
    pub credentials_path: Option<PathBuf>,
}

/// Input shard globs, relative to the input root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sources {
    pub song_data: String,
    pub log_data: String,
}

impl Default for Sources {
    fn default() -> Self {
        Self {
            song_data: DEFAULT_SONG_DATA_GLOB.to_string(),
            log_data: DEFAULT_LOG_DATA_GLOB.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Settings {
    pub region: String,
    pub endpoint: Option<String>,
    pub force_path_style: bool,
}

impl Default for S3Settings {
    fn default() -> Self {
        Self {
            region: DEFAULT_S3_REGION.to_string(),
            endpoint: None,
            force_path_style: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub input_root: DataRoot,
    pub output_root: DataRoot,
    /// `None` when no credentials are needed for this run.
    pub credentials_path: Option<PathBuf>,
    pub sources: Sources,
    pub engine: EngineOptions,
    /// Size of the compute pool, `None` means one thread per core.
    pub worker_threads: Option<usize>,
    pub s3: S3Settings,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let input_root = file
            .input_root
            .or_else(|| cli.input_root.clone())
            .unwrap_or_else(|| DEFAULT_INPUT_ROOT.to_string());
        let input_root = DataRoot::parse(&input_root)?;

        let output_root = file
            .output_root
            .or_else(|| cli.output_root.clone())
            .unwrap_or_else(|| DEFAULT_OUTPUT_ROOT.to_string());
        let output_root = DataRoot::parse(&output_root)?;

        // An explicitly configured credentials file is always required. The
        // implicit default only matters when object storage is involved.
        let credentials_path = match file
            .credentials_path
            .map(PathBuf::from)
            .or_else(|| cli.credentials_path.clone())
        {
            Some(path) => Some(path),
            None if input_root.is_remote() || output_root.is_remote() => {
                Some(PathBuf::from(DEFAULT_CREDENTIALS_PATH))
            }
            None => None,
        };

        let sources_file = file.sources.unwrap_or_default();
        let sources = Sources {
            song_data: non_empty(sources_file.song_data, "sources.song_data")?
                .unwrap_or_else(|| DEFAULT_SONG_DATA_GLOB.to_string()),
            log_data: non_empty(sources_file.log_data, "sources.log_data")?
                .unwrap_or_else(|| DEFAULT_LOG_DATA_GLOB.to_string()),
        };

        let output_file = file.output.unwrap_or_default();
        let engine_file = file.engine.unwrap_or_default();

        let defaults = EngineOptions::default();
        let io_concurrency = engine_file
            .io_concurrency
            .unwrap_or(defaults.io_concurrency);
        if io_concurrency == 0 {
            return Err(EtlError::Config(
                "engine.io_concurrency must be at least 1".to_string(),
            ));
        }
        if engine_file.worker_threads == Some(0) {
            return Err(EtlError::Config(
                "engine.worker_threads must be at least 1".to_string(),
            ));
        }

        let engine = EngineOptions {
            io_concurrency,
            write_mode: parse_setting::<WriteMode>(output_file.write_mode, "output.write_mode")?
                .unwrap_or(defaults.write_mode),
            compression: parse_setting::<Compression>(
                output_file.compression,
                "output.compression",
            )?
            .unwrap_or(defaults.compression),
            timestamp_zone: parse_setting::<TimestampZone>(
                engine_file.timestamp_zone,
                "engine.timestamp_zone",
            )?
            .unwrap_or(defaults.timestamp_zone),
        };

        let s3_file = file.s3.unwrap_or_default();
        let s3 = S3Settings {
            region: s3_file
                .region
                .unwrap_or_else(|| DEFAULT_S3_REGION.to_string()),
            endpoint: s3_file.endpoint,
            force_path_style: s3_file.force_path_style.unwrap_or(false),
        };

        Ok(Self {
            input_root,
            output_root,
            credentials_path,
            sources,
            engine,
            worker_threads: engine_file.worker_threads,
            s3,
        })
    }
}

fn parse_setting<T: ValueEnum>(value: Option<String>, name: &str) -> Result<Option<T>> {
    match value {
        None => Ok(None),
        Some(s) => parse_option::<T>(&s)
            .map(Some)
            .ok_or_else(|| EtlError::Config(format!("Invalid value \"{}\" for {}", s, name))),
    }
}

fn non_empty(value: Option<String>, name: &str) -> Result<Option<String>> {
    match value {
        Some(s) if s.trim().is_empty() => {
            Err(EtlError::Config(format!("{} must not be empty", name)))
        }
        other => Ok(other),
    }
}
