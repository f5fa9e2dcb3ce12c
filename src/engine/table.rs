use crate::error::Result;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;

/// A row of an output table.
///
/// Partition columns live in the directory layout, so `schema` and
/// `to_batch` cover only the remaining data columns.
pub trait TableRow: Send + Sync {
    /// Partition column names, outermost directory level first.
    const PARTITION_BY: &'static [&'static str];

    /// One value per `PARTITION_BY` column, `None` for null.
    fn partition_values(&self) -> Vec<Option<String>>;

    fn schema() -> SchemaRef;

    fn to_batch(rows: &[&Self]) -> Result<RecordBatch>;
}
