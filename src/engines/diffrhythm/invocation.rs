use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::GeneratedTrack;

use super::error::InvocationFailure;

/// A fully resolved run of the DiffRhythm script.
///
/// Built by [`DiffRhythm::build_invocation`](super::DiffRhythm::build_invocation)
/// without touching the filesystem, so the exact command line can be inspected
/// before anything is spawned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptInvocation {
    pub interpreter: PathBuf,
    pub script: PathBuf,
    /// Named flags passed after the script path.
    pub args: Vec<OsString>,
    /// Output directory requested by the caller, created before the run.
    pub output_dir: Option<PathBuf>,
    /// Where the track should appear on success.
    pub expected_output: PathBuf,
    /// Legacy location older script versions always write to.
    pub fallback_output: PathBuf,
}

/// Captured output of a successful script run.
#[derive(Debug, Clone, Default)]
pub struct ScriptOutput {
    pub stdout: String,
    pub stderr: String,
}

impl ScriptInvocation {
    pub fn has_flag(&self, flag: &str) -> bool {
        self.args.iter().any(|arg| arg == flag)
    }

    /// Value following `flag`. Not meaningful for presence-only flags.
    pub fn flag_value(&self, flag: &str) -> Option<&OsStr> {
        self.args
            .iter()
            .position(|arg| arg == flag)
            .and_then(|idx| self.args.get(idx + 1))
            .map(OsString::as_os_str)
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.interpreter);
        cmd.arg(&self.script).args(&self.args);
        cmd
    }

    /// Run the script to completion, capturing stdout and stderr in full.
    pub fn run(&self) -> Result<ScriptOutput, InvocationFailure> {
        let output = self
            .command()
            .stdin(Stdio::null())
            .output()
            .map_err(|source| InvocationFailure::Launch {
                program: self.interpreter.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(InvocationFailure::NonZeroExit {
                code: output.status.code(),
                stdout,
                stderr,
            });
        }

        Ok(ScriptOutput { stdout, stderr })
    }

    /// Locate the generated file after a successful run.
    ///
    /// Checks the expected path first, then the legacy fallback location.
    pub fn resolve_output(&self) -> Result<GeneratedTrack, InvocationFailure> {
        if self.expected_output.is_file() {
            return Ok(GeneratedTrack::new(self.expected_output.clone()));
        }
        if self.fallback_output.is_file() {
            return Ok(GeneratedTrack {
                path: self.fallback_output.clone(),
                used_fallback: true,
            });
        }
        Err(InvocationFailure::OutputNotFound {
            expected: self.expected_output.clone(),
            fallback: self.fallback_output.clone(),
        })
    }
}

impl fmt::Display for ScriptInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}",
            self.interpreter.display(),
            self.script.display()
        )?;
        for arg in &self.args {
            let arg = arg.to_string_lossy();
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " {arg:?}")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::ScriptInvocation;
    use crate::engines::diffrhythm::InvocationFailure;
    use std::ffi::OsString;
    use std::path::{Path, PathBuf};

    fn invocation(dir: &Path, args: &[&str]) -> ScriptInvocation {
        ScriptInvocation {
            interpreter: PathBuf::from("/bin/bash"),
            script: dir.join("run.sh"),
            args: args.iter().map(|arg| OsString::from(*arg)).collect(),
            output_dir: None,
            expected_output: dir.join("out").join("song.wav"),
            fallback_output: dir.join("legacy").join("output.wav"),
        }
    }

    #[test]
    fn looks_up_flag_values() {
        let inv = invocation(
            Path::new("/pkg"),
            &["--ref-prompt", "soft piano", "--chunked", "--audio-length", "95"],
        );
        assert!(inv.has_flag("--chunked"));
        assert!(!inv.has_flag("--ref-audio-path"));
        assert_eq!(inv.flag_value("--ref-prompt").unwrap(), "soft piano");
        assert_eq!(inv.flag_value("--audio-length").unwrap(), "95");
        assert_eq!(inv.flag_value("--repo-id"), None);
    }

    #[test]
    fn display_quotes_arguments_with_spaces() {
        let inv = invocation(Path::new("/pkg"), &["--ref-prompt", "soft piano", "--chunked"]);
        assert_eq!(
            inv.to_string(),
            "/bin/bash /pkg/run.sh --ref-prompt \"soft piano\" --chunked"
        );
    }

    #[test]
    fn prefers_expected_output_over_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let inv = invocation(dir.path(), &[]);
        for path in [&inv.expected_output, &inv.fallback_output] {
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, b"RIFF").unwrap();
        }

        let track = inv.resolve_output().unwrap();
        assert_eq!(track.path, inv.expected_output);
        assert!(!track.used_fallback);
    }

    #[test]
    fn falls_back_to_legacy_output() {
        let dir = tempfile::tempdir().unwrap();
        let inv = invocation(dir.path(), &[]);
        std::fs::create_dir_all(inv.fallback_output.parent().unwrap()).unwrap();
        std::fs::write(&inv.fallback_output, b"RIFF").unwrap();

        let track = inv.resolve_output().unwrap();
        assert_eq!(track.path, inv.fallback_output);
        assert!(track.used_fallback);
    }

    #[test]
    fn reports_missing_output_at_both_locations() {
        let dir = tempfile::tempdir().unwrap();
        let inv = invocation(dir.path(), &[]);

        match inv.resolve_output() {
            Err(InvocationFailure::OutputNotFound { expected, fallback }) => {
                assert_eq!(expected, inv.expected_output);
                assert_eq!(fallback, inv.fallback_output);
            }
            other => panic!("expected OutputNotFound, got {other:?}"),
        }
    }

    #[test]
    fn missing_interpreter_is_a_launch_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut inv = invocation(dir.path(), &[]);
        inv.interpreter = dir.path().join("no-such-shell");

        assert!(matches!(
            inv.run(),
            Err(InvocationFailure::Launch { .. })
        ));
    }
}
