//! Song catalog stage: reads the song metadata and writes the songs and
//! artists tables.

use super::{artists_table, songs_table, SongCatalog, SongRecord};
use crate::engine::{ExecutionContext, WriteSummary};
use crate::error::Result;
use tracing::info;

pub const SONGS_TABLE: &str = "songs.parquet";
pub const ARTISTS_TABLE: &str = "artists.parquet";

#[derive(Debug, Clone)]
pub struct SongStageSummary {
    pub songs: WriteSummary,
    pub artists: WriteSummary,
}

pub async fn read_song_catalog(context: &ExecutionContext, pattern: &str) -> Result<SongCatalog> {
    let records: Vec<SongRecord> = context.read_json(pattern).await?;
    let catalog = context.compute(|| SongCatalog::new(records));
    info!("Song catalog holds {} records", catalog.len());
    Ok(catalog)
}

pub async fn process_song_data(
    context: &ExecutionContext,
    catalog: &SongCatalog,
) -> Result<SongStageSummary> {
    let songs = songs_table(catalog.songs());
    let songs = context.write_table(SONGS_TABLE, &songs).await?;

    let artists = artists_table(catalog.songs());
    let artists = context.write_table(ARTISTS_TABLE, &artists).await?;

    Ok(SongStageSummary { songs, artists })
}
