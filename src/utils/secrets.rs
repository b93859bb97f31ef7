//! API key lookup across the places a notebook or workstation may keep them.
//!
//! A [`SecretResolver`] asks each [`SecretProvider`] in order and returns the
//! first non-empty value. Hosted notebook and competition platforms that
//! mount secrets as files are covered by [`SecretDirectory`]; local runs use
//! [`EnvSecrets`], which also reads a `.env` file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::config::Settings;

#[derive(thiserror::Error, Debug)]
pub enum SecretError {
    #[error(
        "{key} not found (tried: {}). Set it in a mounted secrets directory \
         or as an environment variable (e.g. in a .env file).",
        .tried.join(", ")
    )]
    NotFound { key: String, tried: Vec<String> },
}

/// A single place secrets may live.
///
/// Implementations return `None` both when the key is absent and when the
/// source itself is unavailable; they log the latter at debug level.
pub trait SecretProvider {
    fn name(&self) -> &str;

    fn lookup(&self, key: &str) -> Option<String>;
}

/// Secrets stored one file per key, as mounted by hosted notebooks and
/// container runtimes.
#[derive(Debug, Clone)]
pub struct SecretDirectory {
    root: PathBuf,
    label: String,
}

impl SecretDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let label = format!("secret dir {}", root.display());
        Self { root, label }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SecretProvider for SecretDirectory {
    fn name(&self) -> &str {
        &self.label
    }

    fn lookup(&self, key: &str) -> Option<String> {
        if key.is_empty() || key.contains(['/', '\\']) || key == "." || key == ".." {
            log::debug!("{}: refusing key {key:?}", self.label);
            return None;
        }
        let path = self.root.join(key);
        if !path.is_file() {
            return None;
        }
        match std::fs::read_to_string(&path) {
            Ok(value) => Some(value.trim_end_matches(['\r', '\n']).to_string()),
            Err(e) => {
                log::debug!("{}: failed to read {}: {e}", self.label, path.display());
                None
            }
        }
    }
}

/// Process environment, optionally overridden by a dotenv file.
///
/// The dotenv file is read on every lookup and never written into the
/// process environment.
#[derive(Debug, Clone, Default)]
pub struct EnvSecrets {
    dotenv_path: Option<PathBuf>,
}

impl EnvSecrets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dotenv(path: impl Into<PathBuf>) -> Self {
        Self {
            dotenv_path: Some(path.into()),
        }
    }

    fn dotenv_value(&self, key: &str) -> Option<String> {
        let path = self.dotenv_path.as_deref()?;
        if !path.is_file() {
            return None;
        }
        let entries = match dotenvy::from_path_iter(path) {
            Ok(entries) => entries,
            Err(e) => {
                log::debug!("Could not open {}: {e}", path.display());
                return None;
            }
        };

        let mut found = None;
        for entry in entries {
            match entry {
                Ok((name, value)) if name == key => found = Some(value),
                Ok(_) => {}
                Err(e) => {
                    log::debug!("Stopped reading {}: {e}", path.display());
                    break;
                }
            }
        }
        found
    }
}

impl SecretProvider for EnvSecrets {
    fn name(&self) -> &str {
        "environment"
    }

    fn lookup(&self, key: &str) -> Option<String> {
        self.dotenv_value(key)
            .filter(|v| !v.is_empty())
            .or_else(|| std::env::var(key).ok())
    }
}

/// Fixed in-memory secrets, for tests and embedding applications.
#[derive(Debug, Clone, Default)]
pub struct StaticSecrets {
    values: HashMap<String, String>,
}

impl StaticSecrets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl SecretProvider for StaticSecrets {
    fn name(&self) -> &str {
        "static"
    }

    fn lookup(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Ordered chain of secret providers.
#[derive(Default)]
pub struct SecretResolver {
    providers: Vec<Box<dyn SecretProvider + Send + Sync>>,
}

impl SecretResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mounted secret directories from `settings`, then the environment with
    /// `<base_dir>/.env`.
    pub fn from_settings(settings: &Settings) -> Self {
        let mut resolver = Self::new();
        for dir in &settings.secret_dirs {
            resolver.push(SecretDirectory::new(dir));
        }
        resolver.push(EnvSecrets::with_dotenv(settings.dotenv_path()));
        resolver
    }

    pub fn push(&mut self, provider: impl SecretProvider + Send + Sync + 'static) {
        self.providers.push(Box::new(provider));
    }

    pub fn with_provider(mut self, provider: impl SecretProvider + Send + Sync + 'static) -> Self {
        self.push(provider);
        self
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// First non-empty value for `key`, in provider order.
    pub fn get(&self, key: &str) -> Result<String, SecretError> {
        for provider in &self.providers {
            if let Some(value) = provider.lookup(key).filter(|v| !v.is_empty()) {
                log::info!("Found {key} using provider: {}", provider.name());
                return Ok(value);
            }
        }
        Err(SecretError::NotFound {
            key: key.to_string(),
            tried: self
                .provider_names()
                .into_iter()
                .map(str::to_string)
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{
        EnvSecrets, SecretDirectory, SecretError, SecretProvider, SecretResolver, StaticSecrets,
    };
    use crate::config::Settings;

    #[test]
    fn first_provider_with_a_value_wins() {
        let resolver = SecretResolver::new()
            .with_provider(StaticSecrets::new().with("OTHER", "x"))
            .with_provider(StaticSecrets::new().with("OPENAI_API_KEY", "first"))
            .with_provider(StaticSecrets::new().with("OPENAI_API_KEY", "second"));

        assert_eq!(resolver.get("OPENAI_API_KEY").unwrap(), "first");
    }

    #[test]
    fn empty_values_are_skipped() {
        let resolver = SecretResolver::new()
            .with_provider(StaticSecrets::new().with("HF_TOKEN", ""))
            .with_provider(StaticSecrets::new().with("HF_TOKEN", "hf_abc"));

        assert_eq!(resolver.get("HF_TOKEN").unwrap(), "hf_abc");
    }

    #[test]
    fn not_found_lists_every_provider_tried() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = SecretResolver::new()
            .with_provider(SecretDirectory::new(dir.path()))
            .with_provider(StaticSecrets::new());

        match resolver.get("AI_STORYTELLER_TEST_MISSING_KEY") {
            Err(SecretError::NotFound { key, tried }) => {
                assert_eq!(key, "AI_STORYTELLER_TEST_MISSING_KEY");
                assert_eq!(tried.len(), 2);
                assert_eq!(tried[1], "static");
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn reads_secret_files_without_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("GROQ_API_KEY"), "gsk_123\n").unwrap();
        let provider = SecretDirectory::new(dir.path());

        assert_eq!(provider.lookup("GROQ_API_KEY").as_deref(), Some("gsk_123"));
        assert_eq!(provider.lookup("MISSING"), None);
        assert_eq!(provider.lookup("../GROQ_API_KEY"), None);
    }

    #[test]
    fn dotenv_values_override_process_env() {
        let dir = tempfile::tempdir().unwrap();
        let dotenv = dir.path().join(".env");
        std::fs::write(&dotenv, "AI_STORYTELLER_TEST_OVERRIDE=from-file\n").unwrap();
        std::env::set_var("AI_STORYTELLER_TEST_OVERRIDE", "from-env");

        assert_eq!(
            EnvSecrets::with_dotenv(&dotenv)
                .lookup("AI_STORYTELLER_TEST_OVERRIDE")
                .as_deref(),
            Some("from-file")
        );
        assert_eq!(
            EnvSecrets::new()
                .lookup("AI_STORYTELLER_TEST_OVERRIDE")
                .as_deref(),
            Some("from-env")
        );
    }

    #[test]
    fn falls_back_to_process_env_when_dotenv_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var("AI_STORYTELLER_TEST_ENV_ONLY", "from-env");

        let provider = EnvSecrets::with_dotenv(dir.path().join(".env"));
        assert_eq!(
            provider.lookup("AI_STORYTELLER_TEST_ENV_ONLY").as_deref(),
            Some("from-env")
        );
    }

    #[test]
    fn settings_chain_checks_secret_dirs_before_env() {
        let dir = tempfile::tempdir().unwrap();
        let mounted = dir.path().join("secrets");
        std::fs::create_dir_all(&mounted).unwrap();
        std::fs::write(mounted.join("AI_STORYTELLER_TEST_CHAIN"), "mounted").unwrap();
        std::env::set_var("AI_STORYTELLER_TEST_CHAIN", "from-env");

        let mut settings = Settings::from_base_dir(dir.path());
        settings.secret_dirs.push(mounted);
        let resolver = SecretResolver::from_settings(&settings);

        assert_eq!(resolver.provider_names().last(), Some(&"environment"));
        assert_eq!(resolver.get("AI_STORYTELLER_TEST_CHAIN").unwrap(), "mounted");
    }
}
