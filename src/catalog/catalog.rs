use super::SongRecord;
use std::collections::HashMap;

/// The raw song records, read once and shared by both stages.
///
/// Keeps an exact-match index on (title, artist_name) for the songplay join.
/// Record order is the input order.
#[derive(Debug, Default)]
pub struct SongCatalog {
    songs: Vec<SongRecord>,
    by_title: HashMap<String, HashMap<String, Vec<usize>>>,
}

impl SongCatalog {
    pub fn new(songs: Vec<SongRecord>) -> Self {
        let mut by_title: HashMap<String, HashMap<String, Vec<usize>>> = HashMap::new();
        for (index, song) in songs.iter().enumerate() {
            by_title
                .entry(song.title.clone())
                .or_default()
                .entry(song.artist_name.clone())
                .or_default()
                .push(index);
        }
        SongCatalog { songs, by_title }
    }

    pub fn songs(&self) -> &[SongRecord] {
        &self.songs
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    /// Every record whose title and artist name equal the arguments exactly,
    /// in catalog order.
    pub fn matching<'a>(
        &'a self,
        title: &str,
        artist_name: &str,
    ) -> impl Iterator<Item = &'a SongRecord> + 'a {
        self.by_title
            .get(title)
            .and_then(|artists| artists.get(artist_name))
            .map(|indices| indices.as_slice())
            .unwrap_or(&[])
            .iter()
            .map(move |&index| &self.songs[index])
    }
}
