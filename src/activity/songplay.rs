use super::time::{timestamp_field, timestamp_micros};
use super::PlayEvent;
use crate::catalog::SongCatalog;
use crate::engine::TableRow;
use crate::error::Result;
use arrow::array::{ArrayRef, Int64Array, StringArray, TimestampMicrosecondArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, NaiveDateTime};
use std::sync::Arc;

/// Row of `songplays.parquet`, partitioned by year then month of the start
/// time.
#[derive(Clone, Debug, PartialEq)]
pub struct SongPlayRow {
    pub songplay_id: i64,
    pub start_time: NaiveDateTime,
    pub user_id: Option<String>,
    pub level: Option<String>,
    pub song_id: String,
    pub artist_id: String,
    pub session_id: i64,
    pub location: Option<String>,
    pub user_agent: Option<String>,
}

impl SongPlayRow {
    pub fn year(&self) -> i32 {
        self.start_time.year()
    }

    pub fn month(&self) -> u32 {
        self.start_time.month()
    }
}

#[derive(Debug, Default)]
pub struct SongPlays {
    pub rows: Vec<SongPlayRow>,
    /// Playback events with no catalog song of the same title and artist.
    pub unmatched_events: usize,
}

/// Joins playback events to the catalog on exact (title, artist name).
///
/// Events with a null song or artist never match. An event matching several
/// catalog records yields one row per record. Ids run densely from 1 in
/// (session_id, start_time, input index, catalog order) order.
pub fn songplays_table(events: &[PlayEvent], catalog: &SongCatalog) -> SongPlays {
    let mut unmatched_events = 0;
    let mut joined = Vec::new();

    for event in events {
        let record = &event.record;
        let matches: Vec<_> = match (record.song.as_deref(), record.artist.as_deref()) {
            (Some(title), Some(artist_name)) => catalog.matching(title, artist_name).collect(),
            _ => Vec::new(),
        };
        if matches.is_empty() {
            unmatched_events += 1;
        }
        for song in matches {
            joined.push((event, song));
        }
    }

    // Stable sort keeps catalog order among rows of the same event
    joined.sort_by_key(|(event, _)| (event.record.session_id, event.start_time, event.index));

    let rows = joined
        .into_iter()
        .enumerate()
        .map(|(position, (event, song))| SongPlayRow {
            songplay_id: position as i64 + 1,
            start_time: event.start_time,
            user_id: event.record.user_id.clone(),
            level: event.record.level.clone(),
            song_id: song.song_id.clone(),
            artist_id: song.artist_id.clone(),
            session_id: event.record.session_id,
            location: event.record.location.clone(),
            user_agent: event.record.user_agent.clone(),
        })
        .collect();

    SongPlays {
        rows,
        unmatched_events,
    }
}

impl TableRow for SongPlayRow {
    const PARTITION_BY: &'static [&'static str] = &["year", "month"];

    fn partition_values(&self) -> Vec<Option<String>> {
        vec![Some(self.year().to_string()), Some(self.month().to_string())]
    }

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("songplay_id", DataType::Int64, false),
            timestamp_field("start_time"),
            Field::new("user_id", DataType::Utf8, true),
            Field::new("level", DataType::Utf8, true),
            Field::new("song_id", DataType::Utf8, false),
            Field::new("artist_id", DataType::Utf8, false),
            Field::new("session_id", DataType::Int64, false),
            Field::new("location", DataType::Utf8, true),
            Field::new("user_agent", DataType::Utf8, true),
        ]))
    }

    fn to_batch(rows: &[&Self]) -> Result<RecordBatch> {
        let songplay_id: Int64Array = rows.iter().map(|r| Some(r.songplay_id)).collect();
        let start_time: TimestampMicrosecondArray = rows
            .iter()
            .map(|r| Some(timestamp_micros(&r.start_time)))
            .collect();
        let user_id: StringArray = rows.iter().map(|r| r.user_id.as_deref()).collect();
        let level: StringArray = rows.iter().map(|r| r.level.as_deref()).collect();
        let song_id: StringArray = rows.iter().map(|r| Some(r.song_id.as_str())).collect();
        let artist_id: StringArray = rows.iter().map(|r| Some(r.artist_id.as_str())).collect();
        let session_id: Int64Array = rows.iter().map(|r| Some(r.session_id)).collect();
        let location: StringArray = rows.iter().map(|r| r.location.as_deref()).collect();
        let user_agent: StringArray = rows.iter().map(|r| r.user_agent.as_deref()).collect();
        Ok(RecordBatch::try_new(
            Self::schema(),
            vec![
                Arc::new(songplay_id) as ArrayRef,
                Arc::new(start_time),
                Arc::new(user_id),
                Arc::new(level),
                Arc::new(song_id),
                Arc::new(artist_id),
                Arc::new(session_id),
                Arc::new(location),
                Arc::new(user_agent),
            ],
        )?)
    }
}
