//! # ai-storyteller
//!
//! Integration layer for the AI storyteller: background music through the
//! DiffRhythm generation script, a text-generation seam, secret lookup and
//! lyric utilities.
//!
//! ## Features
//!
//! - **DiffRhythm music**: drives the vendored `run_diffrhythm.sh` script and
//!   resolves the generated WAV file
//! - **Text generation seam**: one trait for raw prompts and chat turns
//! - **Secrets**: ordered providers (mounted secret dirs, env, `.env`)
//! - **Lyrics**: keeps only timestamped `[mm:ss.xx]` LRC lines
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! ai-storyteller = { version = "2026.10", features = ["diffrhythm"] }
//! ```
//!
//! ```ignore
//! use ai_storyteller::config::Settings;
//! use ai_storyteller::engines::diffrhythm::{DiffRhythm, MusicRequestBuilder};
//!
//! let settings = Settings::from_env()?;
//! let engine = DiffRhythm::new(&settings)?;
//!
//! let request = MusicRequestBuilder::default()
//!     .prompt("Lo-fi music with the flute")
//!     .instrumental_only(true)
//!     .build()?;
//!
//! if let Some(track) = engine.try_generate(&request)? {
//!     println!("wrote {}", track.path.display());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod engines;
pub mod text;
pub mod utils;

use std::path::PathBuf;

/// A music file produced by a generation engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedTrack {
    /// Absolute path of the generated audio file
    pub path: PathBuf,
    /// True when the file was found at the engine's legacy output location
    /// rather than where the request asked for it
    pub used_fallback: bool,
}

impl GeneratedTrack {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            used_fallback: false,
        }
    }

    /// Read the WAV header of the generated file.
    pub fn wav_spec(&self) -> Result<hound::WavSpec, hound::Error> {
        Ok(hound::WavReader::open(&self.path)?.spec())
    }

    /// Duration of the audio in seconds, computed from the WAV header.
    pub fn duration_secs(&self) -> Result<f64, hound::Error> {
        let reader = hound::WavReader::open(&self.path)?;
        let spec = reader.spec();
        Ok(reader.duration() as f64 / spec.sample_rate as f64)
    }
}

/// Common interface for music generation engines.
///
/// Generation is delegated to an external program, so implementations block
/// until it exits. Operational failures of that program are reported as
/// `None`; callers are expected to carry on without music.
pub trait MusicGenerationModel {
    /// Generate a track from a style prompt using the engine's defaults.
    fn generate_music(&self, prompt: &str) -> Option<GeneratedTrack>;
}

#[cfg(test)]
mod tests {
    use super::GeneratedTrack;

    #[test]
    fn reads_duration_from_wav_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for _ in 0..4000 {
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();

        let track = GeneratedTrack::new(path);
        assert_eq!(track.wav_spec().unwrap().sample_rate, 8000);
        assert!((track.duration_secs().unwrap() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn non_wav_output_is_reported_as_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.wav");
        std::fs::write(&path, b"not audio").unwrap();

        assert!(GeneratedTrack::new(path).duration_secs().is_err());
    }
}
