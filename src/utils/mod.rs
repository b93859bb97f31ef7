//! Small helpers shared by the storyteller pipeline.

pub mod lyrics;
pub mod secrets;

pub use lyrics::{clean_lyric_lines, write_lrc};
pub use secrets::{SecretError, SecretProvider, SecretResolver};
