//! Job driver.
//!
//! Reads the song catalog once, then runs the song stage and the event log
//! stage one after the other. The first failure aborts the run.

use crate::activity::{process_log_data, LogStageSummary};
use crate::catalog::{process_song_data, read_song_catalog, SongStageSummary};
use crate::config::Sources;
use crate::engine::ExecutionContext;
use crate::error::Result;
use std::time::{Duration, Instant};
use tracing::info;

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub catalog_records: usize,
    pub song_stage: SongStageSummary,
    pub log_stage: LogStageSummary,
    pub elapsed: Duration,
}

pub async fn run(context: &ExecutionContext, sources: &Sources) -> Result<RunSummary> {
    let started = Instant::now();

    info!("Reading song catalog from {}", sources.song_data);
    let catalog = read_song_catalog(context, &sources.song_data).await?;

    info!("Processing song data...");
    let song_stage = process_song_data(context, &catalog).await?;

    info!("Processing log data from {}", sources.log_data);
    let log_stage = process_log_data(context, &catalog, &sources.log_data).await?;

    let summary = RunSummary {
        catalog_records: catalog.len(),
        song_stage,
        log_stage,
        elapsed: started.elapsed(),
    };

    info!("Run {} finished in {:?}", context.run_id(), summary.elapsed);
    info!("  songs:     {} rows", summary.song_stage.songs.rows);
    info!("  artists:   {} rows", summary.song_stage.artists.rows);
    info!("  users:     {} rows", summary.log_stage.users.rows);
    info!("  time:      {} rows", summary.log_stage.time.rows);
    info!(
        "  songplays: {} rows ({} playback events unmatched)",
        summary.log_stage.songplays.rows, summary.log_stage.unmatched_events
    );

    Ok(summary)
}
