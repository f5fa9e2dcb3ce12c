mod event;
mod load;
mod songplay;
mod time;
mod user;

pub use event::{next_song_events, LogRecord, PlayEvent, NEXT_SONG_PAGE};
pub use load::{process_log_data, LogStageSummary, SONGPLAYS_TABLE, TIME_TABLE, USERS_TABLE};
pub use songplay::{songplays_table, SongPlayRow, SongPlays};
pub use time::{start_time, time_table, TimeRow};
pub use user::{users_table, UserRow};
