use clap::ValueEnum;
use parquet::basic::{Compression as ParquetCompression, ZstdLevel};

pub const DEFAULT_IO_CONCURRENCY: usize = 32;

/// How epoch timestamps become calendar timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TimestampZone {
    /// Wall clock in UTC, independent of the host.
    #[default]
    Utc,
    /// Wall clock in the host's local zone.
    Local,
}

/// What happens when a table's output location already has content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum WriteMode {
    #[default]
    Overwrite,
    ErrorIfExists,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Compression {
    #[default]
    Snappy,
    Zstd,
    Uncompressed,
}

impl Compression {
    pub fn codec(&self) -> ParquetCompression {
        match self {
            Compression::Snappy => ParquetCompression::SNAPPY,
            Compression::Zstd => ParquetCompression::ZSTD(ZstdLevel::default()),
            Compression::Uncompressed => ParquetCompression::UNCOMPRESSED,
        }
    }

    /// Infix used in part file names, e.g. `part-00000-<run>.snappy.parquet`.
    pub fn file_infix(&self) -> Option<&'static str> {
        match self {
            Compression::Snappy => Some("snappy"),
            Compression::Zstd => Some("zstd"),
            Compression::Uncompressed => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Maximum number of in-flight storage requests.
    pub io_concurrency: usize,
    pub write_mode: WriteMode,
    pub compression: Compression,
    pub timestamp_zone: TimestampZone,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            io_concurrency: DEFAULT_IO_CONCURRENCY,
            write_mode: WriteMode::default(),
            compression: Compression::default(),
            timestamp_zone: TimestampZone::default(),
        }
    }
}

/// Parses a case-insensitive option value using its clap spelling.
pub fn parse_option<T: ValueEnum>(s: &str) -> Option<T> {
    T::from_str(s, true).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_option() {
        assert_eq!(parse_option("utc"), Some(TimestampZone::Utc));
        assert_eq!(parse_option("LOCAL"), Some(TimestampZone::Local));
        assert_eq!(parse_option("overwrite"), Some(WriteMode::Overwrite));
        assert_eq!(
            parse_option("error-if-exists"),
            Some(WriteMode::ErrorIfExists)
        );
        assert_eq!(parse_option("Zstd"), Some(Compression::Zstd));
        assert_eq!(parse_option::<Compression>("gzip"), None);
    }

    #[test]
    fn test_file_infix() {
        assert_eq!(Compression::Snappy.file_infix(), Some("snappy"));
        assert_eq!(Compression::Uncompressed.file_infix(), None);
    }
}
