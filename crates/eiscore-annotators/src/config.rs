//! Annotator configuration and factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use eiscore_core::engine::BatchConfig;
use eiscore_core::traits::Annotator;

use crate::corenlp::{CoreNlpAnnotator, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use crate::lexicon::LexiconAnnotator;

/// Environment variable that overrides the CoreNLP base URL.
pub const CORENLP_URL_ENV: &str = "EISCORE_CORENLP_URL";

/// Which annotator to score with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AnnotatorConfig {
    CoreNlp {
        #[serde(default = "default_corenlp_url")]
        base_url: String,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
    Lexicon {
        /// TOML word list; only the built-in copula forms when absent.
        #[serde(default)]
        path: Option<PathBuf>,
    },
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        AnnotatorConfig::CoreNlp {
            base_url: default_corenlp_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_corenlp_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Top-level eiscore configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EiscoreConfig {
    #[serde(default)]
    pub annotator: AnnotatorConfig,
    /// Max concurrent scoring calls in a batch.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    /// Max retries on transient annotator errors.
    #[serde(default = "default_retries")]
    pub max_retries: u32,
    /// Delay before the first retry in milliseconds.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
    /// Output directory for reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_parallelism() -> usize {
    4
}
fn default_retries() -> u32 {
    3
}
fn default_retry_delay() -> u64 {
    500
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./eiscore-results")
}

impl Default for EiscoreConfig {
    fn default() -> Self {
        Self {
            annotator: AnnotatorConfig::default(),
            parallelism: default_parallelism(),
            max_retries: default_retries(),
            retry_delay_ms: default_retry_delay(),
            output_dir: default_output_dir(),
        }
    }
}

impl EiscoreConfig {
    pub fn batch_config(&self) -> BatchConfig {
        BatchConfig {
            parallelism: self.parallelism,
            max_retries: self.max_retries,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }

    /// Resolve `${VAR}` references, make a relative lexicon path relative to
    /// `base_dir`, and apply a CoreNLP URL override.
    fn resolve(&mut self, base_dir: Option<&Path>, corenlp_url: Option<String>) {
        match &mut self.annotator {
            AnnotatorConfig::CoreNlp { base_url, .. } => {
                *base_url = match corenlp_url {
                    Some(url) => url,
                    None => resolve_env_vars(base_url),
                };
            }
            AnnotatorConfig::Lexicon { path: Some(path) } => {
                let resolved = PathBuf::from(resolve_env_vars(&path.to_string_lossy()));
                *path = match base_dir {
                    Some(dir) if resolved.is_relative() => dir.join(resolved),
                    _ => resolved,
                };
            }
            AnnotatorConfig::Lexicon { path: None } => {}
        }
        self.output_dir = PathBuf::from(resolve_env_vars(&self.output_dir.to_string_lossy()));
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
/// Substituted values are copied verbatim and never rescanned.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + end];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `eiscore.toml` in the current directory
/// 2. `~/.config/eiscore/config.toml`
///
/// `EISCORE_CORENLP_URL` overrides the CoreNLP base URL.
pub fn load_config() -> Result<EiscoreConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<EiscoreConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("eiscore.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let (mut config, base_dir) = match &config_path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = toml::from_str::<EiscoreConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            (config, path.parent())
        }
        None => (EiscoreConfig::default(), None),
    };

    config.resolve(base_dir, std::env::var(CORENLP_URL_ENV).ok());
    tracing::debug!(?config_path, annotator = ?config.annotator, "loaded configuration");
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("eiscore"))
}

/// Create an annotator instance from its configuration.
pub fn create_annotator(config: &AnnotatorConfig) -> Result<Arc<dyn Annotator>> {
    match config {
        AnnotatorConfig::CoreNlp {
            base_url,
            timeout_secs,
        } => Ok(Arc::new(CoreNlpAnnotator::new(base_url, *timeout_secs)?)),
        AnnotatorConfig::Lexicon { path: Some(path) } => {
            Ok(Arc::new(LexiconAnnotator::from_path(path)?))
        }
        AnnotatorConfig::Lexicon { path: None } => Ok(Arc::new(LexiconAnnotator::new())),
    }
}
