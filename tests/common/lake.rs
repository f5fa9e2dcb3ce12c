//! Test lake wrapper: fixture input, an empty output root and helpers to read
//! the written tables back.

use super::fixtures::create_test_lake;
use arrow::array::{
    Array, ArrayRef, Float64Array, Int32Array, Int64Array, StringArray,
    TimestampMicrosecondArray,
};
use arrow::datatypes::{DataType, TimeUnit};
use chrono::DateTime;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use songplays_etl::config::Sources;
use songplays_etl::engine::{EngineOptions, WriteMode, DEFAULT_PARTITION_NAME};
use songplays_etl::storage::LocalStorage;
use songplays_etl::{pipeline, ExecutionContext, RunSummary};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use walkdir::WalkDir;

/// One output row, partition columns included. Null cells are `None`.
pub type Row = BTreeMap<String, Option<String>>;

pub struct TestLake {
    _dir: TempDir,
    pub input: PathBuf,
    pub output: PathBuf,
}

impl TestLake {
    pub fn create() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let input = dir.path().join("input");
        let output = dir.path().join("output");
        create_test_lake(&input).expect("Failed to write fixture lake");
        fs::create_dir_all(&output).expect("Failed to create output dir");
        TestLake {
            _dir: dir,
            input,
            output,
        }
    }

    pub fn context(&self, write_mode: WriteMode) -> ExecutionContext {
        let options = EngineOptions {
            write_mode,
            ..Default::default()
        };
        ExecutionContext::new(
            Arc::new(LocalStorage::new(self.input.clone())),
            Arc::new(LocalStorage::new(self.output.clone())),
            options,
            Some(2),
        )
        .expect("Failed to create execution context")
    }

    pub async fn run(&self) -> RunSummary {
        pipeline::run(&self.context(WriteMode::Overwrite), &Sources::default())
            .await
            .expect("ETL run failed")
    }

    pub fn table_dir(&self, table: &str) -> PathBuf {
        self.output.join(table)
    }

    /// Every row of `table`, in part file path order.
    pub fn read_table(&self, table: &str) -> Vec<Row> {
        let table_dir = self.table_dir(table);
        let mut files: Vec<PathBuf> = WalkDir::new(&table_dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "parquet"))
            .collect();
        files.sort();

        let mut rows = Vec::new();
        for file in files {
            let partition = partition_values(&table_dir, &file);
            let reader = ParquetRecordBatchReaderBuilder::try_new(
                fs::File::open(&file).expect("Failed to open part file"),
            )
            .expect("Not a parquet file")
            .build()
            .expect("Failed to build reader");

            for batch in reader {
                let batch = batch.expect("Failed to read batch");
                let schema = batch.schema();
                for index in 0..batch.num_rows() {
                    let mut row = partition.clone();
                    for (field, column) in schema.fields().iter().zip(batch.columns()) {
                        row.insert(field.name().clone(), cell(column, index));
                    }
                    rows.push(row);
                }
            }
        }
        rows
    }
}

fn partition_values(table_dir: &Path, file: &Path) -> Row {
    let relative = file.strip_prefix(table_dir).expect("File outside table");
    relative
        .parent()
        .into_iter()
        .flat_map(|dir| dir.components())
        .filter_map(|c| {
            let segment = c.as_os_str().to_str()?;
            let (column, value) = segment.split_once('=')?;
            let value = (value != DEFAULT_PARTITION_NAME).then(|| value.to_string());
            Some((column.to_string(), value))
        })
        .collect()
}

fn cell(column: &ArrayRef, index: usize) -> Option<String> {
    if column.is_null(index) {
        return None;
    }
    let any = column.as_any();
    let text = match column.data_type() {
        DataType::Utf8 => any
            .downcast_ref::<StringArray>()
            .unwrap()
            .value(index)
            .to_string(),
        DataType::Int32 => any
            .downcast_ref::<Int32Array>()
            .unwrap()
            .value(index)
            .to_string(),
        DataType::Int64 => any
            .downcast_ref::<Int64Array>()
            .unwrap()
            .value(index)
            .to_string(),
        DataType::Float64 => any
            .downcast_ref::<Float64Array>()
            .unwrap()
            .value(index)
            .to_string(),
        DataType::Timestamp(TimeUnit::Microsecond, None) => {
            let micros = any
                .downcast_ref::<TimestampMicrosecondArray>()
                .unwrap()
                .value(index);
            DateTime::from_timestamp_micros(micros)
                .unwrap()
                .naive_utc()
                .to_string()
        }
        other => panic!("Unexpected column type {:?}", other),
    };
    Some(text)
}

/// Cell of `row` as a string slice, panicking on a missing column.
pub fn get<'a>(row: &'a Row, column: &str) -> Option<&'a str> {
    row.get(column)
        .unwrap_or_else(|| panic!("No column {} in {:?}", column, row))
        .as_deref()
}
