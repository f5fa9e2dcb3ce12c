//! Common test infrastructure
//!
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{get, TestLake, SONG_X_ID};
//!
//! #[tokio::test]
//! async fn test_songs_table() {
//!     let lake = TestLake::create();
//!     lake.run().await;
//!
//!     let songs = lake.read_table("songs.parquet");
//!     assert!(songs.iter().any(|row| get(row, "song_id") == Some(SONG_X_ID)));
//! }
//! ```

mod constants;
mod fixtures;
mod lake;

// Public API - this is what tests import
#[allow(unused_imports)]
pub use constants::*;
#[allow(unused_imports)]
pub use lake::{get, Row, TestLake};
