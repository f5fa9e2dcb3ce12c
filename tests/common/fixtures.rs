//! Fixture data lake
//!
//! Lays out a miniature copy of the input lake:
//!
//! ```text
//! input/song_data/A/A/{A,B,C}/*.json    one song object per file
//! input/song_data/A/B/A/*.json          outside the catalog glob
//! input/log_data/2018/11/*-events.json  newline-delimited events
//! ```

use super::constants::*;
use anyhow::Result;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

fn write_json(path: &Path, records: &[Value]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let lines: Vec<String> = records.iter().map(|r| r.to_string()).collect();
    fs::write(path, lines.join("\n"))?;
    Ok(())
}

fn song(
    song_id: &str,
    title: &str,
    artist_id: &str,
    artist_name: &str,
    year: i32,
    duration: f64,
) -> Value {
    json!({
        "num_songs": 1,
        "artist_id": artist_id,
        "artist_latitude": null,
        "artist_longitude": null,
        "artist_location": null,
        "artist_name": artist_name,
        "song_id": song_id,
        "title": title,
        "duration": duration,
        "year": year
    })
}

fn play(user_id: &str, level: &str, session_id: i64, ts: i64, song: &str, artist: &str) -> Value {
    json!({
        "artist": artist,
        "auth": "Logged In",
        "firstName": format!("First{}", user_id),
        "gender": "F",
        "itemInSession": 0,
        "lastName": format!("Last{}", user_id),
        "length": 200.0,
        "level": level,
        "location": "Phoenix-Mesa-Scottsdale, AZ",
        "method": "PUT",
        "page": "NextSong",
        "registration": 1540344794796.0,
        "sessionId": session_id,
        "song": song,
        "status": 200,
        "ts": ts,
        "userAgent": "Mozilla/5.0",
        "userId": user_id
    })
}

fn navigation(page: &str, user_id: &str, session_id: i64, ts: i64) -> Value {
    json!({
        "artist": null,
        "auth": "Logged In",
        "firstName": format!("First{}", user_id),
        "gender": "M",
        "itemInSession": 0,
        "lastName": format!("Last{}", user_id),
        "length": null,
        "level": "free",
        "location": null,
        "method": "GET",
        "page": page,
        "registration": null,
        "sessionId": session_id,
        "song": null,
        "status": 200,
        "ts": ts,
        "userAgent": null,
        "userId": user_id
    })
}

/// Writes the fixture song metadata and activity log under `input`.
pub fn create_test_lake(input: &Path) -> Result<()> {
    let song_data = input.join("song_data");

    write_json(
        &song_data.join("A/A/A/TRAAAAA128F4262AB1.json"),
        &[song(SONG_X_ID, SONG_X_TITLE, ARTIST_Y_ID, ARTIST_Y_NAME, 2000, 180.0)],
    )?;

    let mut hello = song(
        SONG_HELLO_ID,
        SONG_HELLO_TITLE,
        ARTIST_ADELE_ID,
        ARTIST_ADELE_NAME,
        2015,
        295.5,
    );
    hello["artist_latitude"] = json!(51.50632);
    hello["artist_longitude"] = json!(-0.12714);
    hello["artist_location"] = json!("London, England");
    write_json(&song_data.join("A/A/B/TRAABHE128F4262AB2.json"), &[hello])?;

    let mut dompfaff = song(
        SONG_DOMPFAFF_ID,
        "Der Kleine Dompfaff",
        ARTIST_LINE_ID,
        "Line Renaud",
        0,
        152.92036,
    );
    dompfaff["artist_location"] = json!("");
    write_json(&song_data.join("A/A/C/TRAACDP128F4262AB3.json"), &[dompfaff])?;

    write_json(
        &song_data.join("A/B/A/TRABAOU128F4262AB4.json"),
        &[song(
            "SOOUTSIDE",
            SONG_OUTSIDE_TITLE,
            "AROUTSIDE",
            ARTIST_OUTSIDE_NAME,
            1999,
            100.0,
        )],
    )?;

    let log_data = input.join("log_data/2018/11");
    write_json(
        &log_data.join("2018-11-01-events.json"),
        &[
            navigation("Login", "", 3, 1_541_105_830_796),
            play(
                "1",
                "free",
                SESSION_X_PLAY,
                TS_X_PLAY,
                SONG_X_TITLE,
                ARTIST_Y_NAME,
            ),
            play(
                USER_LEVEL_CHANGE_ID,
                "free",
                7,
                1_541_106_106_796,
                SONG_HELLO_TITLE,
                ARTIST_ADELE_NAME,
            ),
            play(
                USER_LEVEL_CHANGE_ID,
                "paid",
                7,
                1_541_107_053_796,
                SONG_HELLO_TITLE,
                ARTIST_ADELE_NAME,
            ),
            play("3", "free", 2, 1_541_108_520_796, "Unknown Song", "Unknown Artist"),
            play(
                "3",
                "free",
                2,
                1_541_108_520_796,
                SONG_OUTSIDE_TITLE,
                ARTIST_OUTSIDE_NAME,
            ),
        ],
    )?;
    write_json(
        &log_data.join("2018-11-02-events.json"),
        &[
            navigation("Home", USER_NAVIGATION_ONLY_ID, 9, 1_541_120_000_000),
            play(
                "1",
                "free",
                1,
                1_541_123_456_000,
                SONG_HELLO_TITLE,
                ARTIST_ADELE_NAME,
            ),
        ],
    )?;
    // Not JSON, must be skipped as a hidden file
    fs::write(log_data.join(".2018-11-01-events.json.crc"), b"\x00crc")?;

    Ok(())
}
