use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::{GeneratedTrack, MusicGenerationModel};

use super::error::{DiffRhythmError, InvocationFailure};
use super::invocation::ScriptInvocation;
use super::request::{
    validate_output_file_name, AudioLength, MusicRequest, DEFAULT_OUTPUT_FILE_NAME,
};

/// Interpreter used to run the generation script.
pub const DEFAULT_INTERPRETER: &str = "/bin/bash";

/// DiffRhythm music generation engine.
///
/// Wraps the vendored `scripts/run_diffrhythm.sh`. Each call to
/// [`generate`](Self::generate) runs the script once and blocks until it
/// exits; there is no timeout. Concurrent callers must use distinct output
/// directories.
///
/// ```rust,no_run
/// use ai_storyteller::config::Settings;
/// use ai_storyteller::engines::diffrhythm::{DiffRhythm, MusicRequestBuilder};
///
/// let engine = DiffRhythm::new(&Settings::from_env()?)?;
/// let request = MusicRequestBuilder::default()
///     .prompt("Jazzy nightclub vibe")
///     .output_dir("out/chapter-1")
///     .output_file_name("theme.wav")
///     .build()?;
/// let track = engine.generate(&request)?;
/// println!("{}", track.path.display());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct DiffRhythm {
    package_path: PathBuf,
    script_path: PathBuf,
    data_dir: PathBuf,
    interpreter: PathBuf,
}

impl DiffRhythm {
    /// Use the package vendored at `<vendor_dir>/DiffRhythm`.
    pub fn new(settings: &Settings) -> Result<Self, DiffRhythmError> {
        Self::with_package_path(settings, &settings.vendor_dir.join("DiffRhythm"))
    }

    /// Use a DiffRhythm checkout at an explicit location.
    pub fn with_package_path(
        settings: &Settings,
        package_path: &Path,
    ) -> Result<Self, DiffRhythmError> {
        let package_path = std::path::absolute(package_path)?;
        if !package_path.is_dir() {
            return Err(DiffRhythmError::PackageNotFound(package_path));
        }
        log::info!("DiffRhythm package path set to: {}", package_path.display());

        let script_path = package_path.join("scripts").join("run_diffrhythm.sh");
        if !script_path.is_file() {
            return Err(DiffRhythmError::ScriptNotFound(script_path));
        }
        log::info!("Using DiffRhythm shell script: {}", script_path.display());

        let engine = Self {
            package_path,
            script_path,
            data_dir: std::path::absolute(&settings.data_dir)?,
            interpreter: PathBuf::from(DEFAULT_INTERPRETER),
        };
        for asset in [engine.default_lrc_path(), engine.empty_lrc_path()] {
            if !asset.is_file() {
                log::warn!("Default lyrics asset missing: {}", asset.display());
            }
        }
        Ok(engine)
    }

    /// Run the script with a different shell.
    pub fn with_interpreter(mut self, interpreter: impl Into<PathBuf>) -> Self {
        self.interpreter = interpreter.into();
        self
    }

    pub fn script_path(&self) -> &Path {
        &self.script_path
    }

    /// Lyrics used when the request names none.
    pub fn default_lrc_path(&self) -> PathBuf {
        self.data_dir
            .join("music_generation")
            .join("lrc")
            .join("eg_en_full.lrc")
    }

    /// Lyrics used for instrumental requests that name none.
    pub fn empty_lrc_path(&self) -> PathBuf {
        self.data_dir
            .join("music_generation")
            .join("music")
            .join("empty.lrc")
    }

    /// Directory the script writes to when no `--output-dir` is passed.
    pub fn default_output_dir(&self) -> PathBuf {
        self.package_path.join("infer").join("example").join("output")
    }

    /// Resolve a request into the exact command line and output locations.
    ///
    /// Validates the audio length before anything else and has no side
    /// effects.
    pub fn build_invocation(
        &self,
        request: &MusicRequest,
    ) -> Result<ScriptInvocation, DiffRhythmError> {
        let audio_length = AudioLength::try_from(request.audio_length)?;
        validate_output_file_name(&request.output_file_name)?;

        let lrc_path = match non_empty_path(request.lrc_path.as_deref()) {
            Some(path) => path.to_path_buf(),
            None if request.instrumental_only => {
                let path = self.empty_lrc_path();
                log::info!(
                    "Instrumental only requested, using empty lyrics: {}",
                    path.display()
                );
                path
            }
            None => {
                let path = self.default_lrc_path();
                log::info!("LRC path not provided, using default: {}", path.display());
                path
            }
        };

        let prompt = request.prompt.as_deref().filter(|p| !p.is_empty());
        let mut ref_audio_path = non_empty_path(request.ref_audio_path.as_deref());
        if let (Some(_), Some(ignored)) = (prompt, ref_audio_path) {
            log::warn!(
                "Both prompt and reference audio path provided, using prompt only; ignoring {}",
                ignored.display()
            );
            ref_audio_path = None;
        }

        let output_dir = non_empty_path(request.output_dir.as_deref())
            .map(std::path::absolute)
            .transpose()?;
        let effective_output_dir = match &output_dir {
            Some(dir) => dir.clone(),
            None => self.default_output_dir(),
        };

        let mut args: Vec<OsString> = Vec::new();
        push_flag(&mut args, "--lrc-path", std::path::absolute(&lrc_path)?);
        if let Some(prompt) = prompt {
            push_flag(&mut args, "--ref-prompt", prompt);
        }
        if let Some(path) = ref_audio_path {
            push_flag(&mut args, "--ref-audio-path", std::path::absolute(path)?);
        }
        if request.chunked {
            args.push("--chunked".into());
        }
        push_flag(&mut args, "--audio-length", audio_length.to_string());
        push_flag(&mut args, "--repo-id", &request.repo_id);
        if let Some(dir) = &output_dir {
            push_flag(&mut args, "--output-dir", dir);
        }
        push_flag(&mut args, "--output-file-name", &request.output_file_name);

        Ok(ScriptInvocation {
            interpreter: self.interpreter.clone(),
            script: self.script_path.clone(),
            args,
            expected_output: effective_output_dir.join(&request.output_file_name),
            fallback_output: self.default_output_dir().join(DEFAULT_OUTPUT_FILE_NAME),
            output_dir,
        })
    }

    /// Generate a track, returning why it failed if it did.
    ///
    /// Request validation errors are returned before the script is started.
    /// Script failures come back as [`DiffRhythmError::Invocation`] after
    /// being logged along with the captured output.
    pub fn generate(&self, request: &MusicRequest) -> Result<GeneratedTrack, DiffRhythmError> {
        let invocation = self.build_invocation(request)?;

        match &invocation.output_dir {
            Some(dir) => {
                if let Err(e) = std::fs::create_dir_all(dir) {
                    log::warn!(
                        "Could not create specified output directory {}: {e}",
                        dir.display()
                    );
                }
            }
            None => log::info!(
                "Output directory not specified, expecting output in script default: {}",
                self.default_output_dir().display()
            ),
        }

        log::info!("Executing shell script: {invocation}");
        let output = invocation.run().inspect_err(log_failure)?;
        log::debug!("DiffRhythm stdout:\n{}", output.stdout);
        if !output.stderr.is_empty() {
            log::debug!("DiffRhythm stderr:\n{}", output.stderr);
        }

        let track = invocation.resolve_output().inspect_err(log_failure)?;
        if track.used_fallback {
            log::warn!(
                "Output not found at {}, using legacy location {}",
                invocation.expected_output.display(),
                track.path.display()
            );
        } else {
            log::info!("Successfully generated: {}", track.path.display());
        }
        Ok(track)
    }

    /// Like [`generate`](Self::generate), but script failures become `Ok(None)`.
    ///
    /// Construction and request errors still propagate; callers can skip the
    /// music and carry on when the script itself fails.
    pub fn try_generate(
        &self,
        request: &MusicRequest,
    ) -> Result<Option<GeneratedTrack>, DiffRhythmError> {
        match self.generate(request) {
            Ok(track) => Ok(Some(track)),
            Err(DiffRhythmError::Invocation(_)) => {
                log::error!("Music generation via shell script failed.");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

impl MusicGenerationModel for DiffRhythm {
    fn generate_music(&self, prompt: &str) -> Option<GeneratedTrack> {
        let request = MusicRequest {
            prompt: Some(prompt.to_string()),
            instrumental_only: true,
            ..Default::default()
        };
        self.try_generate(&request).unwrap_or_else(|e| {
            log::error!("Music generation failed: {e}");
            None
        })
    }
}

fn non_empty_path(path: Option<&Path>) -> Option<&Path> {
    path.filter(|p| !p.as_os_str().is_empty())
}

fn push_flag(args: &mut Vec<OsString>, flag: &str, value: impl Into<OsString>) {
    args.push(flag.into());
    args.push(value.into());
}

fn log_failure(failure: &InvocationFailure) {
    match failure {
        InvocationFailure::Launch { program, source } => {
            log::error!(
                "File not found during execution ({} or script): {source}",
                program.display()
            );
        }
        InvocationFailure::NonZeroExit {
            stdout, stderr, ..
        } => {
            log::error!("{failure}");
            log::error!("stdout:\n{stdout}");
            log::error!("stderr:\n{stderr}");
        }
        InvocationFailure::OutputNotFound { .. } => log::error!("{failure}"),
    }
}
