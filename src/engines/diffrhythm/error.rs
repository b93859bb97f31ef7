use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum DiffRhythmError {
    #[error("DiffRhythm package root not found at {}", .0.display())]
    PackageNotFound(PathBuf),
    #[error("DiffRhythm shell script not found at {}", .0.display())]
    ScriptNotFound(PathBuf),
    #[error("audio_length must be either 95 or 285 seconds, got {0}")]
    InvalidAudioLength(u32),
    #[error("output_file_name must not be empty")]
    EmptyOutputFileName,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Invocation(#[from] InvocationFailure),
}

impl DiffRhythmError {
    /// True for failures of the external script itself, as opposed to
    /// configuration or request errors.
    pub fn is_invocation_failure(&self) -> bool {
        matches!(self, DiffRhythmError::Invocation(_))
    }
}

/// Why a run of the generation script did not produce a track.
#[derive(thiserror::Error, Debug)]
pub enum InvocationFailure {
    #[error("Could not launch {} (interpreter or script missing): {source}", .program.display())]
    Launch {
        program: PathBuf,
        source: std::io::Error,
    },
    #[error("DiffRhythm script exited with {}", exit_description(.code))]
    NonZeroExit {
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },
    #[error(
        "DiffRhythm script reported success, but no output was found at {} or {}",
        .expected.display(),
        .fallback.display()
    )]
    OutputNotFound { expected: PathBuf, fallback: PathBuf },
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}
