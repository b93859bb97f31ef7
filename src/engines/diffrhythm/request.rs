use std::fmt;
use std::path::PathBuf;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use super::error::DiffRhythmError;

/// Model repository passed to the script when the caller does not pick one.
pub const DEFAULT_REPO_ID: &str = "ASLP-lab/DiffRhythm-full";

/// File name the script writes when the caller does not pick one.
pub const DEFAULT_OUTPUT_FILE_NAME: &str = "output.wav";

/// Track lengths supported by the DiffRhythm checkpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum AudioLength {
    /// 95 seconds
    Short,
    /// 285 seconds
    Full,
}

impl AudioLength {
    pub fn as_secs(self) -> u32 {
        match self {
            AudioLength::Short => 95,
            AudioLength::Full => 285,
        }
    }
}

impl TryFrom<u32> for AudioLength {
    type Error = DiffRhythmError;

    fn try_from(secs: u32) -> Result<Self, Self::Error> {
        match secs {
            95 => Ok(AudioLength::Short),
            285 => Ok(AudioLength::Full),
            other => Err(DiffRhythmError::InvalidAudioLength(other)),
        }
    }
}

impl From<AudioLength> for u32 {
    fn from(length: AudioLength) -> Self {
        length.as_secs()
    }
}

impl fmt::Display for AudioLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_secs())
    }
}

/// Parameters for one DiffRhythm generation run.
///
/// Empty strings for the optional text and path fields are treated the same
/// as `None`.
///
/// ```rust
/// use ai_storyteller::engines::diffrhythm::MusicRequestBuilder;
///
/// let request = MusicRequestBuilder::default()
///     .prompt("Calm harp under a starry sky")
///     .audio_length(285)
///     .output_dir("/tmp/story/music")
///     .build()?;
/// assert!(request.chunked);
///
/// assert!(MusicRequestBuilder::default().audio_length(120).build().is_err());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(build_fn(validate = "Self::validate"))]
#[serde(default)]
pub struct MusicRequest {
    /// Style prompt (`--ref-prompt`). Takes precedence over `ref_audio_path`.
    #[builder(setter(into, strip_option), default)]
    pub prompt: Option<String>,
    /// Lyrics file (`--lrc-path`). Defaults to the bundled example lyrics.
    #[builder(setter(into, strip_option), default)]
    pub lrc_path: Option<PathBuf>,
    /// Reference audio for style (`--ref-audio-path`).
    #[builder(setter(into, strip_option), default)]
    pub ref_audio_path: Option<PathBuf>,
    /// Track length in seconds; must be 95 or 285.
    #[builder(default = "AudioLength::Short.as_secs()")]
    pub audio_length: u32,
    /// Chunked decoding (`--chunked`).
    #[builder(default = "true")]
    pub chunked: bool,
    #[builder(setter(into), default = "DEFAULT_REPO_ID.to_string()")]
    pub repo_id: String,
    /// Where the script should write. `None` leaves it to the script's own
    /// default under the package directory.
    #[builder(setter(into, strip_option), default)]
    pub output_dir: Option<PathBuf>,
    #[builder(setter(into), default = "DEFAULT_OUTPUT_FILE_NAME.to_string()")]
    pub output_file_name: String,
    /// Use the empty lyrics asset when no `lrc_path` is given.
    #[builder(default)]
    pub instrumental_only: bool,
}

impl Default for MusicRequest {
    fn default() -> Self {
        Self {
            prompt: None,
            lrc_path: None,
            ref_audio_path: None,
            audio_length: AudioLength::Short.as_secs(),
            chunked: true,
            repo_id: DEFAULT_REPO_ID.to_string(),
            output_dir: None,
            output_file_name: DEFAULT_OUTPUT_FILE_NAME.to_string(),
            instrumental_only: false,
        }
    }
}

/// The script writes `<output dir>/<name>`, so an empty name would point at
/// the directory itself.
pub(crate) fn validate_output_file_name(name: &str) -> Result<(), DiffRhythmError> {
    if name.trim().is_empty() {
        return Err(DiffRhythmError::EmptyOutputFileName);
    }
    Ok(())
}

impl MusicRequestBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(secs) = self.audio_length {
            AudioLength::try_from(secs).map_err(|e| e.to_string())?;
        }
        if let Some(name) = &self.output_file_name {
            validate_output_file_name(name).map_err(|e| e.to_string())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{AudioLength, MusicRequest, MusicRequestBuilder, DEFAULT_REPO_ID};
    use std::path::PathBuf;

    #[test]
    fn accepts_only_supported_lengths() {
        assert_eq!(AudioLength::try_from(95).unwrap(), AudioLength::Short);
        assert_eq!(AudioLength::try_from(285).unwrap(), AudioLength::Full);
        for secs in [0, 94, 96, 120, 284, 286, 600] {
            assert!(AudioLength::try_from(secs).is_err(), "{secs} should be rejected");
        }
    }

    #[test]
    fn builder_defaults_match_request_defaults() {
        let built = MusicRequestBuilder::default().build().unwrap();
        assert_eq!(built, MusicRequest::default());
        assert_eq!(built.audio_length, 95);
        assert!(built.chunked);
        assert_eq!(built.repo_id, DEFAULT_REPO_ID);
        assert_eq!(built.output_file_name, "output.wav");
    }

    #[test]
    fn builder_rejects_invalid_length() {
        let err = MusicRequestBuilder::default()
            .audio_length(120)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("95 or 285"));
    }

    #[test]
    fn builder_rejects_empty_output_file_name() {
        let err = MusicRequestBuilder::default()
            .output_file_name("")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("output_file_name"));
        assert!(MusicRequestBuilder::default()
            .output_file_name("  ")
            .build()
            .is_err());
    }

    #[test]
    fn builder_strips_options() {
        let request = MusicRequestBuilder::default()
            .prompt("Lo-fi music with the flute")
            .output_dir("/tmp/music")
            .instrumental_only(true)
            .build()
            .unwrap();
        assert_eq!(request.prompt.as_deref(), Some("Lo-fi music with the flute"));
        assert_eq!(request.output_dir, Some(PathBuf::from("/tmp/music")));
        assert!(request.instrumental_only);
    }

    #[test]
    fn deserializes_request_with_defaults() {
        let request: MusicRequest = serde_json::from_str(
            r#"{"prompt": "epic drums", "audio_length": 285, "chunked": false,
                "output_file_name": "battle.wav"}"#,
        )
        .unwrap();
        assert_eq!(request.audio_length, 285);
        assert!(!request.chunked);
        assert_eq!(request.output_file_name, "battle.wav");
        assert_eq!(request.repo_id, DEFAULT_REPO_ID);
        assert!(request.lrc_path.is_none());
        assert!(!request.instrumental_only);
    }

    #[test]
    fn audio_length_serializes_as_seconds() {
        assert_eq!(serde_json::to_string(&AudioLength::Full).unwrap(), "285");
        assert!(serde_json::from_str::<AudioLength>("100").is_err());
    }
}
