//! Storage roots the job reads from and writes to.
//!
//! Keys are always relative to a root and use `/` as separator, whichever
//! backend serves them.

mod local;
mod s3;

pub use local::LocalStorage;
pub use s3::S3Storage;

use crate::config::S3Settings;
use crate::error::{EtlError, Result};
use async_trait::async_trait;
use glob::{MatchOptions, Pattern};
use std::fmt::{self, Debug, Display};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

const S3_SCHEMES: &[&str] = &["s3://", "s3a://", "s3n://"];
const FILE_SCHEME: &str = "file://";

/// A URI-addressed root location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataRoot {
    Local(PathBuf),
    S3 { bucket: String, prefix: String },
}

impl DataRoot {
    pub fn parse(uri: &str) -> Result<Self> {
        let uri = uri.trim();
        if uri.is_empty() {
            return Err(EtlError::Config("Storage root must not be empty".to_string()));
        }

        for scheme in S3_SCHEMES {
            if let Some(rest) = uri.strip_prefix(scheme) {
                let (bucket, prefix) = rest.split_once('/').unwrap_or((rest, ""));
                if bucket.is_empty() {
                    return Err(EtlError::Config(format!("No bucket in storage root {}", uri)));
                }
                return Ok(DataRoot::S3 {
                    bucket: bucket.to_string(),
                    prefix: prefix.trim_matches('/').to_string(),
                });
            }
        }

        if let Some(path) = uri.strip_prefix(FILE_SCHEME) {
            if path.is_empty() {
                return Err(EtlError::Config(format!("No path in storage root {}", uri)));
            }
            return Ok(DataRoot::Local(PathBuf::from(path)));
        }

        if uri.contains("://") {
            return Err(EtlError::Config(format!(
                "Unsupported storage scheme in {}",
                uri
            )));
        }

        Ok(DataRoot::Local(PathBuf::from(uri)))
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, DataRoot::S3 { .. })
    }
}

impl Display for DataRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataRoot::Local(path) => write!(f, "{}", path.display()),
            DataRoot::S3 { bucket, prefix } if prefix.is_empty() => write!(f, "s3://{}/", bucket),
            DataRoot::S3 { bucket, prefix } => write!(f, "s3://{}/{}/", bucket, prefix),
        }
    }
}

#[async_trait]
pub trait Storage: Send + Sync + Debug {
    /// All file keys starting with `prefix`, in no particular order.
    async fn list_prefix(&self, prefix: &str) -> Result<Vec<String>>;

    async fn read(&self, key: &str) -> Result<Vec<u8>>;

    /// Creates or replaces the object at `key`.
    async fn write(&self, key: &str, bytes: Vec<u8>) -> Result<()>;

    /// Removes every object under `prefix` and returns how many were removed.
    async fn delete_prefix(&self, prefix: &str) -> Result<usize>;

    /// Human readable location of `key`, for logs and errors.
    fn uri_for(&self, key: &str) -> String;
}

pub async fn open_storage(root: &DataRoot, s3: &S3Settings) -> Result<Arc<dyn Storage>> {
    match root {
        DataRoot::Local(path) => Ok(Arc::new(LocalStorage::new(path.clone()))),
        DataRoot::S3 { bucket, prefix } => Ok(Arc::new(
            S3Storage::connect(bucket.clone(), prefix.clone(), s3).await?,
        )),
    }
}

/// A Spark-style input glob.
///
/// `*` never crosses a `/`. A pattern ending in `/` names directories and
/// selects the files directly inside them. Hidden files and files under
/// hidden directories (leading `.` or `_`, e.g. `_SUCCESS`, `_temporary/`)
/// never match.
#[derive(Debug, Clone)]
pub struct KeyGlob {
    pattern: Pattern,
    literal_prefix: String,
}

impl KeyGlob {
    pub fn new(pattern: &str) -> Result<Self> {
        let mut normalized = pattern.trim_start_matches('/').to_string();
        if normalized.is_empty() {
            return Err(EtlError::Config("Empty input pattern".to_string()));
        }
        if normalized.ends_with('/') {
            normalized.push('*');
        }

        let first_meta = normalized
            .find(|c: char| matches!(c, '*' | '?' | '['))
            .unwrap_or(normalized.len());
        let literal_prefix = match normalized[..first_meta].rfind('/') {
            Some(slash) => normalized[..=slash].to_string(),
            None if first_meta == normalized.len() => normalized.clone(),
            None => String::new(),
        };

        let pattern = Pattern::new(&normalized)
            .map_err(|e| EtlError::Config(format!("Invalid input pattern {}: {}", pattern, e)))?;

        Ok(Self {
            pattern,
            literal_prefix,
        })
    }

    /// Longest leading part of the pattern without wildcards, cut at a `/`.
    pub fn literal_prefix(&self) -> &str {
        &self.literal_prefix
    }

    pub fn matches(&self, key: &str) -> bool {
        // Every segment below the literal prefix counts, so files inside
        // `_temporary/` or `.staging/` directories are hidden too
        let file_name = key.rsplit('/').next().unwrap_or(key);
        let below_prefix = key
            .strip_prefix(self.literal_prefix.as_str())
            .filter(|rest| !rest.is_empty())
            .unwrap_or(file_name);
        if below_prefix
            .split('/')
            .any(|segment| segment.starts_with('.') || segment.starts_with('_'))
        {
            return false;
        }
        self.pattern.matches_with(
            key,
            MatchOptions {
                case_sensitive: true,
                require_literal_separator: true,
                require_literal_leading_dot: false,
            },
        )
    }
}

/// Sorted keys matching `pattern` under the storage root.
pub async fn glob_keys(storage: &dyn Storage, pattern: &str) -> Result<Vec<String>> {
    let glob = KeyGlob::new(pattern)?;
    let mut keys: Vec<String> = storage
        .list_prefix(glob.literal_prefix())
        .await?
        .into_iter()
        .filter(|key| glob.matches(key))
        .collect();
    keys.sort();
    debug!(
        "{} keys match {}",
        keys.len(),
        storage.uri_for(pattern.trim_start_matches('/'))
    );
    Ok(keys)
}

/// Joins key segments with exactly one `/` between them.
pub fn join_key(base: &str, key: &str) -> String {
    let base = base.trim_end_matches('/');
    let key = key.trim_start_matches('/');
    match (base.is_empty(), key.is_empty()) {
        (true, _) => key.to_string(),
        (false, true) => format!("{}/", base),
        (false, false) => format!("{}/{}", base, key),
    }
}
