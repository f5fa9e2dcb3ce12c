//! Shared constants for end-to-end tests
//!
//! Everything the fixture lake contains is named here. When the fixture data
//! changes, update only this file and fixtures.rs.

// ============================================================================
// Song catalog
// ============================================================================

/// "X" by "Y", the minimal catalog song.
pub const SONG_X_ID: &str = "S1";
pub const SONG_X_TITLE: &str = "X";
pub const ARTIST_Y_ID: &str = "A1";
pub const ARTIST_Y_NAME: &str = "Y";

/// "Hello" by "Adele", with full artist metadata.
pub const SONG_HELLO_ID: &str = "SOHELLO12AB0187B9B";
pub const SONG_HELLO_TITLE: &str = "Hello";
pub const ARTIST_ADELE_ID: &str = "ARADELE1187B9AE5";
pub const ARTIST_ADELE_NAME: &str = "Adele";

/// Unknown release year (0) and an empty location.
pub const SONG_DOMPFAFF_ID: &str = "SOUPIRU12A6D4FA1E1";
pub const ARTIST_LINE_ID: &str = "ARJIE2Y1187B994AB7";

/// Lives under song_data/A/B/, outside the catalog glob.
pub const SONG_OUTSIDE_TITLE: &str = "Outside";
pub const ARTIST_OUTSIDE_NAME: &str = "Nobody";

pub const CATALOG_SONGS: usize = 3;

// ============================================================================
// Activity log
// ============================================================================

/// 2001-09-09 01:46:40 UTC, a Sunday.
pub const TS_X_PLAY: i64 = 1_000_000_000_000;
pub const SESSION_X_PLAY: i64 = 5;

pub const LOG_RECORDS: usize = 8;
pub const NEXT_SONG_RECORDS: usize = 6;
pub const UNMATCHED_PLAYS: usize = 2;
pub const SONGPLAYS: usize = 4;
/// Two unmatched plays share a start time.
pub const DISTINCT_START_TIMES: usize = 5;

/// Plays free then paid: one user row per level.
pub const USER_LEVEL_CHANGE_ID: &str = "2";
/// Only ever seen on navigation pages.
pub const USER_NAVIGATION_ONLY_ID: &str = "4";
pub const USER_ROWS: usize = 4;
