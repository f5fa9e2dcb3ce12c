use super::PlayEvent;
use crate::engine::TableRow;
use crate::error::Result;
use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use indexmap::IndexSet;
use std::sync::Arc;

/// Row of `users.parquet`.
///
/// Rows are distinct over every column, not over `user_id`: a user seen on
/// both the free and the paid level gets one row per level.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UserRow {
    pub user_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub level: Option<String>,
}

impl From<&PlayEvent> for UserRow {
    fn from(event: &PlayEvent) -> Self {
        let record = &event.record;
        UserRow {
            user_id: record.user_id.clone(),
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            gender: record.gender.clone(),
            level: record.level.clone(),
        }
    }
}

/// Distinct users in order of first appearance.
pub fn users_table(events: &[PlayEvent]) -> Vec<UserRow> {
    events
        .iter()
        .map(UserRow::from)
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

impl TableRow for UserRow {
    const PARTITION_BY: &'static [&'static str] = &[];

    fn partition_values(&self) -> Vec<Option<String>> {
        Vec::new()
    }

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("user_id", DataType::Utf8, true),
            Field::new("first_name", DataType::Utf8, true),
            Field::new("last_name", DataType::Utf8, true),
            Field::new("gender", DataType::Utf8, true),
            Field::new("level", DataType::Utf8, true),
        ]))
    }

    fn to_batch(rows: &[&Self]) -> Result<RecordBatch> {
        let column = |get: fn(&UserRow) -> Option<&str>| -> ArrayRef {
            Arc::new(rows.iter().map(|r| get(r)).collect::<StringArray>())
        };
        Ok(RecordBatch::try_new(
            Self::schema(),
            vec![
                column(|r| r.user_id.as_deref()),
                column(|r| r.first_name.as_deref()),
                column(|r| r.last_name.as_deref()),
                column(|r| r.gender.as_deref()),
                column(|r| r.level.as_deref()),
            ],
        )?)
    }
}
