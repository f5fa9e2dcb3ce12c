mod artist;
#[allow(clippy::module_inception)]
mod catalog;
mod load;
mod song;

pub use artist::{artists_table, ArtistRow};
pub use catalog::SongCatalog;
pub use load::{
    process_song_data, read_song_catalog, SongStageSummary, ARTISTS_TABLE, SONGS_TABLE,
};
pub use song::{songs_table, SongRecord, SongRow};
