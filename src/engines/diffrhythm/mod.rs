//! DiffRhythm music generation engine.
//!
//! DiffRhythm itself is not linked into this crate: a vendored checkout ships
//! a `run_diffrhythm.sh` wrapper around its inference script, and this module
//! builds that script's command line, runs it with `/bin/bash`, and finds the
//! WAV file it wrote.
//!
//! # Package Layout
//!
//! ```text
//! vendor/DiffRhythm/
//! ├── scripts/run_diffrhythm.sh    # required at construction
//! └── infer/example/output/        # script's default (and legacy) output dir
//! ```
//!
//! # Script Contract
//!
//! | Flag | Passed when |
//! |---|---|
//! | `--lrc-path PATH` | always (request path, example lyrics, or empty lyrics) |
//! | `--ref-prompt TEXT` | a prompt is given |
//! | `--ref-audio-path PATH` | reference audio is given and no prompt is |
//! | `--chunked` | `chunked` is true |
//! | `--audio-length {95\|285}` | always |
//! | `--repo-id ID` | always |
//! | `--output-dir PATH` | an output directory is given |
//! | `--output-file-name NAME` | always |
//!
//! Exit code 0 means success. Older script releases ignore the output flags
//! and always write `infer/example/output/output.wav`, so that location is
//! checked when the requested file is missing.
//!
//! # Failure Handling
//!
//! | Condition | Result |
//! |---|---|
//! | package or script missing | [`DiffRhythmError`] from the constructor |
//! | audio length not 95/285 | [`DiffRhythmError::InvalidAudioLength`], nothing spawned |
//! | empty output file name | [`DiffRhythmError::EmptyOutputFileName`], nothing spawned |
//! | interpreter cannot start | [`InvocationFailure::Launch`] |
//! | non-zero exit | [`InvocationFailure::NonZeroExit`] with captured output |
//! | exit 0, no file at either location | [`InvocationFailure::OutputNotFound`] |
//!
//! [`DiffRhythm::try_generate`] turns every [`InvocationFailure`] into
//! `Ok(None)`.

pub mod engine;
pub mod error;
pub mod invocation;
pub mod request;

pub use engine::{DiffRhythm, DEFAULT_INTERPRETER};
pub use error::{DiffRhythmError, InvocationFailure};
pub use invocation::{ScriptInvocation, ScriptOutput};
pub use request::{
    AudioLength, MusicRequest, MusicRequestBuilder, MusicRequestBuilderError,
    DEFAULT_OUTPUT_FILE_NAME, DEFAULT_REPO_ID,
};
