use super::PlayEvent;
use crate::engine::{TableRow, TimestampZone};
use crate::error::{EtlError, Result};
use arrow::array::{ArrayRef, Int32Array, TimestampMicrosecondArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Datelike, Local, NaiveDateTime, Timelike};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Converts an epoch-millisecond timestamp to a second-precision wall clock
/// time in `zone`. Sub-second precision is dropped, rounding toward the past.
pub fn start_time(ts: i64, zone: TimestampZone) -> Result<NaiveDateTime> {
    let utc = DateTime::from_timestamp(ts.div_euclid(1000), 0)
        .ok_or(EtlError::InvalidTimestamp(ts))?;
    Ok(match zone {
        TimestampZone::Utc => utc.naive_utc(),
        TimestampZone::Local => utc.with_timezone(&Local).naive_local(),
    })
}

/// Parquet stores start times as microsecond timestamps without a zone.
pub(crate) fn timestamp_micros(time: &NaiveDateTime) -> i64 {
    time.and_utc().timestamp_micros()
}

pub(crate) fn timestamp_field(name: &str) -> Field {
    Field::new(name, DataType::Timestamp(TimeUnit::Microsecond, None), false)
}

/// Row of `time.parquet`, partitioned by year then month.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeRow {
    pub start_time: NaiveDateTime,
    pub hour: i32,
    pub day: i32,
    /// ISO week of the year.
    pub week: i32,
    pub month: i32,
    pub year: i32,
    /// ISO weekday, 1 = Monday through 7 = Sunday. One higher than Spark's
    /// 0-based `weekday()`.
    pub weekday: i32,
}

impl From<NaiveDateTime> for TimeRow {
    fn from(start_time: NaiveDateTime) -> Self {
        TimeRow {
            start_time,
            hour: start_time.hour() as i32,
            day: start_time.day() as i32,
            week: start_time.iso_week().week() as i32,
            month: start_time.month() as i32,
            year: start_time.year(),
            weekday: start_time.weekday().number_from_monday() as i32,
        }
    }
}

/// One row per distinct start time, ordered by start time.
pub fn time_table(events: &[PlayEvent]) -> Vec<TimeRow> {
    events
        .iter()
        .map(|event| event.start_time)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(TimeRow::from)
        .collect()
}

impl TableRow for TimeRow {
    const PARTITION_BY: &'static [&'static str] = &["year", "month"];

    fn partition_values(&self) -> Vec<Option<String>> {
        vec![Some(self.year.to_string()), Some(self.month.to_string())]
    }

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            timestamp_field("start_time"),
            Field::new("hour", DataType::Int32, false),
            Field::new("day", DataType::Int32, false),
            Field::new("week", DataType::Int32, false),
            Field::new("weekday", DataType::Int32, false),
        ]))
    }

    fn to_batch(rows: &[&Self]) -> Result<RecordBatch> {
        let start_time: TimestampMicrosecondArray = rows
            .iter()
            .map(|r| Some(timestamp_micros(&r.start_time)))
            .collect();
        let hour: Int32Array = rows.iter().map(|r| Some(r.hour)).collect();
        let day: Int32Array = rows.iter().map(|r| Some(r.day)).collect();
        let week: Int32Array = rows.iter().map(|r| Some(r.week)).collect();
        let weekday: Int32Array = rows.iter().map(|r| Some(r.weekday)).collect();
        Ok(RecordBatch::try_new(
            Self::schema(),
            vec![
                Arc::new(start_time) as ArrayRef,
                Arc::new(hour),
                Arc::new(day),
                Arc::new(week),
                Arc::new(weekday),
            ],
        )?)
    }
}
