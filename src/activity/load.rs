//! Event log stage: reads the activity log and writes the users, time and
//! songplays tables.

use super::{next_song_events, songplays_table, time_table, users_table, LogRecord};
use crate::catalog::SongCatalog;
use crate::engine::{ExecutionContext, WriteSummary};
use crate::error::Result;
use tracing::{info, warn};

pub const USERS_TABLE: &str = "users.parquet";
pub const TIME_TABLE: &str = "time.parquet";
pub const SONGPLAYS_TABLE: &str = "songplays.parquet";

#[derive(Debug, Clone)]
pub struct LogStageSummary {
    pub events_read: usize,
    pub next_song_events: usize,
    /// Playback events dropped by the songplay join.
    pub unmatched_events: usize,
    pub users: WriteSummary,
    pub time: WriteSummary,
    pub songplays: WriteSummary,
}

pub async fn process_log_data(
    context: &ExecutionContext,
    catalog: &SongCatalog,
    pattern: &str,
) -> Result<LogStageSummary> {
    let records: Vec<LogRecord> = context.read_json(pattern).await?;
    let events_read = records.len();

    let zone = context.options().timestamp_zone;
    let events = context.compute(|| next_song_events(records, zone))?;
    info!(
        "{} of {} log records are playback events",
        events.len(),
        events_read
    );

    let users = context.compute(|| users_table(&events));
    let users = context.write_table(USERS_TABLE, &users).await?;

    let time = context.compute(|| time_table(&events));
    let time = context.write_table(TIME_TABLE, &time).await?;

    let plays = context.compute(|| songplays_table(&events, catalog));
    if plays.unmatched_events > 0 {
        warn!(
            "{} playback events matched no catalog song and were dropped",
            plays.unmatched_events
        );
    }
    let songplays = context.write_table(SONGPLAYS_TABLE, &plays.rows).await?;

    Ok(LogStageSummary {
        events_read,
        next_song_events: events.len(),
        unmatched_events: plays.unmatched_events,
        users,
        time,
        songplays,
    })
}
