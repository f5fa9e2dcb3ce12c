//! Object-storage credentials.
//!
//! The credentials file is a small INI document:
//!
//! ```text
//! [AWS]
//! AWS_ACCESS_KEY_ID = AKIA...
//! AWS_SECRET_ACCESS_KEY = ...
//! ```
//!
//! Both keys are read once at startup and exported into the process
//! environment, where the AWS SDK credential chain picks them up.

use crate::error::{EtlError, Result};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

pub const CREDENTIALS_SECTION: &str = "AWS";
pub const ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn load(path: &Path) -> Result<Self> {
        let origin = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|e| EtlError::Credentials {
            path: origin.clone(),
            reason: e.to_string(),
        })?;
        Self::parse(&text, &origin)
    }

    pub fn parse(text: &str, origin: &str) -> Result<Self> {
        let fail = |reason: String| EtlError::Credentials {
            path: origin.to_string(),
            reason,
        };

        let sections = parse_ini(text).map_err(fail)?;
        let section = sections
            .get(CREDENTIALS_SECTION)
            .ok_or_else(|| fail(format!("missing [{}] section", CREDENTIALS_SECTION)))?;

        let get = |key: &str| -> Result<String> {
            match section.get(&key.to_ascii_lowercase()) {
                Some(value) if !value.is_empty() => Ok(value.clone()),
                Some(_) => Err(fail(format!("{} is empty", key))),
                None => Err(fail(format!("missing {}", key))),
            }
        };

        Ok(Credentials {
            access_key_id: get(ACCESS_KEY_ID)?,
            secret_access_key: get(SECRET_ACCESS_KEY)?,
        })
    }

    /// Makes the keys visible to storage clients built after this call.
    pub fn export_to_env(&self) {
        std::env::set_var(ACCESS_KEY_ID, &self.access_key_id);
        std::env::set_var(SECRET_ACCESS_KEY, &self.secret_access_key);
    }
}

/// Section names are case sensitive, keys are not.
fn parse_ini(text: &str) -> std::result::Result<HashMap<String, HashMap<String, String>>, String> {
    let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
    let mut current: Option<String> = None;

    for (line_no, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(name) = line.strip_prefix('[') {
            let name = name
                .strip_suffix(']')
                .ok_or_else(|| format!("line {}: unterminated section header", line_no + 1))?
                .trim();
            sections.entry(name.to_string()).or_default();
            current = Some(name.to_string());
            continue;
        }

        let split_at = line
            .find(|c: char| c == '=' || c == ':')
            .ok_or_else(|| format!("line {}: expected key = value", line_no + 1))?;
        let key = line[..split_at].trim().to_ascii_lowercase();
        let value = unquote(line[split_at + 1..].trim());

        let section = current
            .as_ref()
            .ok_or_else(|| format!("line {}: key outside of any section", line_no + 1))?;
        sections
            .entry(section.clone())
            .or_default()
            .insert(key, value.to_string());
    }

    Ok(sections)
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
