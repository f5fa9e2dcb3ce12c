//! Partitioned Parquet output.
//!
//! A table is a directory of part files, hive-partitioned on the row type's
//! partition columns:
//!
//! ```text
//! songs.parquet/
//!   year=2000/artist_id=AR1/part-00000-<run>.snappy.parquet
//!   ...
//!   _SUCCESS
//! ```
//!
//! `_SUCCESS` is written last, after every part file landed.

use super::{ExecutionContext, TableRow, WriteMode};
use crate::engine::Compression;
use crate::error::{EtlError, Result};
use arrow::record_batch::RecordBatch;
use futures::stream::{self, StreamExt, TryStreamExt};
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;
use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::{debug, info};
use uuid::Uuid;

pub const SUCCESS_MARKER: &str = "_SUCCESS";
/// Directory value used for null (or empty) partition values.
pub const DEFAULT_PARTITION_NAME: &str = "__HIVE_DEFAULT_PARTITION__";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteSummary {
    pub location: String,
    pub rows: usize,
    pub partitions: usize,
    pub files: usize,
}

fn needs_escape(c: char) -> bool {
    matches!(
        c,
        '"' | '#' | '%' | '\'' | '*' | '/' | ':' | '=' | '?' | '\\' | '\x7F' | '{' | '[' | ']' | '^'
    ) || ('\x01'..='\x1F').contains(&c)
}

/// Percent-escapes characters that would break a `column=value` directory.
pub(crate) fn escape_partition_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if needs_escape(c) {
            escaped.push_str(&format!("%{:02X}", c as u32));
        } else {
            escaped.push(c);
        }
    }
    escaped
}

pub(crate) fn partition_dir(columns: &[&str], values: &[Option<String>]) -> String {
    columns
        .iter()
        .zip(values)
        .map(|(column, value)| match value.as_deref() {
            None | Some("") => format!("{}={}", column, DEFAULT_PARTITION_NAME),
            Some(v) => format!("{}={}", column, escape_partition_value(v)),
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn part_file_name(index: usize, run_id: Uuid, compression: Compression) -> String {
    match compression.file_infix() {
        Some(infix) => format!("part-{:05}-{}.{}.parquet", index, run_id, infix),
        None => format!("part-{:05}-{}.parquet", index, run_id),
    }
}

fn encode_parquet(batch: &RecordBatch, compression: Compression) -> Result<Vec<u8>> {
    let props = WriterProperties::builder()
        .set_compression(compression.codec())
        .build();
    let mut writer = ArrowWriter::try_new(Vec::new(), batch.schema(), Some(props))?;
    writer.write(batch)?;
    Ok(writer.into_inner()?)
}

impl ExecutionContext {
    /// Writes `rows` as the table `table` under the output root.
    pub async fn write_table<R: TableRow>(&self, table: &str, rows: &[R]) -> Result<WriteSummary> {
        let storage = self.output();
        let table_prefix = format!("{}/", table.trim_matches('/'));
        let location = storage.uri_for(&table_prefix);

        match self.options().write_mode {
            WriteMode::Overwrite => {
                let removed = storage.delete_prefix(&table_prefix).await?;
                if removed > 0 {
                    debug!("Removed {} files from previous run at {}", removed, location);
                }
            }
            WriteMode::ErrorIfExists => {
                if !storage.list_prefix(&table_prefix).await?.is_empty() {
                    return Err(EtlError::OutputExists(location));
                }
            }
        }

        let mut grouped: BTreeMap<Vec<Option<String>>, Vec<&R>> = BTreeMap::new();
        for row in rows {
            grouped.entry(row.partition_values()).or_default().push(row);
        }
        let groups: Vec<(Vec<Option<String>>, Vec<&R>)> = grouped.into_iter().collect();
        let partitions = groups.len();

        let compression = self.options().compression;
        let run_id = self.run_id();
        let files: Vec<(String, Vec<u8>)> = self.compute(|| {
            groups
                .par_iter()
                .enumerate()
                .map(|(index, (values, rows))| {
                    let batch = R::to_batch(rows)?;
                    let bytes = encode_parquet(&batch, compression)?;
                    let file_name = part_file_name(index, run_id, compression);
                    let key = if R::PARTITION_BY.is_empty() {
                        format!("{}{}", table_prefix, file_name)
                    } else {
                        format!(
                            "{}{}/{}",
                            table_prefix,
                            partition_dir(R::PARTITION_BY, values),
                            file_name
                        )
                    };
                    Ok((key, bytes))
                })
                .collect::<Result<Vec<_>>>()
        })?;
        let file_count = files.len();

        stream::iter(files)
            .map(|(key, bytes)| async move {
                debug!("Writing {} ({} bytes)", storage.uri_for(&key), bytes.len());
                storage.write(&key, bytes).await
            })
            .buffer_unordered(self.options().io_concurrency)
            .try_collect::<Vec<()>>()
            .await?;

        storage
            .write(&format!("{}{}", table_prefix, SUCCESS_MARKER), Vec::new())
            .await?;

        info!(
            "Wrote {} rows to {} ({} partitions, {} files)",
            rows.len(),
            location,
            partitions,
            file_count
        );

        Ok(WriteSummary {
            location,
            rows: rows.len(),
            partitions,
            files: file_count,
        })
    }
}
