//! Pure text parsing for streaming pages: season/episode cascades,
//! title cleanup, and clock-string conversion.

pub mod season_episode;
pub mod time;
pub mod title;

pub use season_episode::{parse_default, parse_with, Pattern, SeasonEpisode};
