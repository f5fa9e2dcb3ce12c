use super::time::start_time;
use crate::engine::TimestampZone;
use crate::error::Result;
use chrono::NaiveDateTime;
use rayon::prelude::*;
use serde::{Deserialize, Deserializer};

/// Page value of a playback event.
pub const NEXT_SONG_PAGE: &str = "NextSong";

/// One user activity record as found in the lake.
///
/// Only `page`, `ts` and `sessionId` are always present; anonymous and
/// navigation events leave most of the rest null.
#[derive(Clone, Deserialize, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub page: String,
    pub ts: i64,
    pub session_id: i64,
    #[serde(default, deserialize_with = "user_id_as_text")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub song: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub length: Option<f64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub auth: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub status: Option<i64>,
    #[serde(default)]
    pub item_in_session: Option<i64>,
    #[serde(default)]
    pub registration: Option<f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum UserId {
    Text(String),
    Number(i64),
}

/// Log shards carry user ids as strings, but some exports write numbers.
fn user_id_as_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<UserId>::deserialize(deserializer)?.map(|id| match id {
            UserId::Text(text) => text,
            UserId::Number(number) => number.to_string(),
        }),
    )
}

/// A playback event with its derived start time.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayEvent {
    /// Position of the record in the input listing.
    pub index: usize,
    pub start_time: NaiveDateTime,
    pub record: LogRecord,
}

/// Keeps the `NextSong` records, in input order, and derives their start time.
pub fn next_song_events(records: Vec<LogRecord>, zone: TimestampZone) -> Result<Vec<PlayEvent>> {
    records
        .into_par_iter()
        .enumerate()
        .filter(|(_, record)| record.page == NEXT_SONG_PAGE)
        .map(|(index, record)| {
            Ok(PlayEvent {
                index,
                start_time: start_time(record.ts, zone)?,
                record,
            })
        })
        .collect()
}
