use crate::engine::TableRow;
use crate::error::Result;
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use serde::Deserialize;
use std::sync::Arc;

/// One song metadata record as found in the lake.
#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct SongRecord {
    pub song_id: String,
    pub title: String,
    pub artist_id: String,
    pub artist_name: String,
    pub year: i32,
    pub duration: f64,
    #[serde(default)]
    pub artist_location: Option<String>,
    #[serde(default)]
    pub artist_latitude: Option<f64>,
    #[serde(default)]
    pub artist_longitude: Option<f64>,
    #[serde(default)]
    pub num_songs: Option<i64>,
}

/// Row of `songs.parquet`, partitioned by year then artist_id.
#[derive(Clone, Debug, PartialEq)]
pub struct SongRow {
    pub song_id: String,
    pub title: String,
    pub artist_id: String,
    pub year: i32,
    pub duration: f64,
}

impl From<&SongRecord> for SongRow {
    fn from(record: &SongRecord) -> Self {
        SongRow {
            song_id: record.song_id.clone(),
            title: record.title.clone(),
            artist_id: record.artist_id.clone(),
            year: record.year,
            duration: record.duration,
        }
    }
}

/// Projects every record, duplicates included.
pub fn songs_table(records: &[SongRecord]) -> Vec<SongRow> {
    records.iter().map(SongRow::from).collect()
}

impl TableRow for SongRow {
    const PARTITION_BY: &'static [&'static str] = &["year", "artist_id"];

    fn partition_values(&self) -> Vec<Option<String>> {
        vec![Some(self.year.to_string()), Some(self.artist_id.clone())]
    }

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("song_id", DataType::Utf8, false),
            Field::new("title", DataType::Utf8, false),
            Field::new("duration", DataType::Float64, false),
        ]))
    }

    fn to_batch(rows: &[&Self]) -> Result<RecordBatch> {
        let song_id: StringArray = rows.iter().map(|r| Some(r.song_id.as_str())).collect();
        let title: StringArray = rows.iter().map(|r| Some(r.title.as_str())).collect();
        let duration: Float64Array = rows.iter().map(|r| Some(r.duration)).collect();
        Ok(RecordBatch::try_new(
            Self::schema(),
            vec![
                Arc::new(song_id) as ArrayRef,
                Arc::new(title),
                Arc::new(duration),
            ],
        )?)
    }
}
