//! ---
//! otr_section: "01-core-functionality"
//! otr_subsection: "module"
//! otr_type: "source"
//! otr_scope: "code"
//! otr_description: "Shared primitives and utilities for the bundle test runtime."
//! otr_version: "v0.0.0-prealpha"
//! otr_owner: "tbd"
//! ---
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds, DurationSeconds};
use tracing::debug;

use crate::logging::LogFormat;

fn default_project_marker() -> String {
    "Cargo.toml".to_owned()
}

fn default_manifest_dir() -> PathBuf {
    PathBuf::from("forTest/META-INF")
}

fn default_poll_interval() -> Duration {
    Duration::from_millis(200)
}

fn default_max_time() -> Duration {
    Duration::from_secs(5)
}

fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

/// Primary configuration object for a test runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Local Maven repository used to resolve artifact coordinates.
    #[serde(default)]
    pub maven_repository: Option<PathBuf>,
    /// Explicit project root for project-relative directory scans.
    #[serde(default)]
    pub project_root: Option<PathBuf>,
    /// File whose presence marks a project directory during root discovery.
    #[serde(default = "default_project_marker")]
    pub project_marker: String,
    /// Roots searched by the ambient resource loader.
    #[serde(default)]
    pub classpath: Vec<PathBuf>,
    /// Resource directory holding test manifests for `manifest_from`.
    #[serde(default = "default_manifest_dir")]
    pub manifest_dir: PathBuf,
    #[serde(default)]
    pub wait: WaitConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl HarnessConfig {
    pub const ENV_CONFIG_PATH: &str = "OTR_CONFIG";

    /// Load configuration from disk, respecting the `OTR_CONFIG` override.
    ///
    /// Unlike daemon configuration, a missing file is not an error: test
    /// suites without a config file run on the defaults.
    pub fn load<P: AsRef<Path>>(candidates: &[P]) -> Result<Self> {
        if let Ok(env_path) = std::env::var(Self::ENV_CONFIG_PATH) {
            if !env_path.trim().is_empty() {
                return Self::from_path(PathBuf::from(env_path));
            }
        }

        for candidate in candidates {
            if candidate.as_ref().exists() {
                return Self::from_path(candidate.as_ref().to_path_buf());
            }
        }

        debug!("no harness configuration found, using defaults");
        Ok(Self::default())
    }

    fn from_path(path: PathBuf) -> Result<Self> {
        debug!(config_path = %path.display(), "loading harness configuration");
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("unable to read config file {}", path.display()))?;
        contents
            .parse::<HarnessConfig>()
            .with_context(|| format!("failed to load config file {}", path.display()))
    }

    /// Resolve the Maven repository root, defaulting to `~/.m2/repository`.
    pub fn maven_repository(&self) -> Result<PathBuf> {
        if let Some(repo) = &self.maven_repository {
            return Ok(repo.clone());
        }
        let home = dirs::home_dir()
            .ok_or_else(|| anyhow!("unable to determine home directory for maven repository"))?;
        Ok(home.join(".m2").join("repository"))
    }

    /// Validate structural invariants.
    pub fn validate(&self) -> Result<()> {
        if self.wait.poll_interval.is_zero() {
            return Err(anyhow!("wait.poll_interval must be greater than zero"));
        }
        if self.project_marker.trim().is_empty() {
            return Err(anyhow!("project_marker cannot be empty"));
        }
        Ok(())
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            maven_repository: None,
            project_root: None,
            project_marker: default_project_marker(),
            classpath: Vec::new(),
            manifest_dir: default_manifest_dir(),
            wait: WaitConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl std::str::FromStr for HarnessConfig {
    type Err = anyhow::Error;

    fn from_str(content: &str) -> std::result::Result<Self, Self::Err> {
        let config: HarnessConfig =
            toml::from_str(content).with_context(|| "failed to parse harness configuration")?;
        config.validate()?;
        Ok(config)
    }
}

/// Defaults applied to every `hold()` created by a runtime.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitConfig {
    #[serde(default = "default_poll_interval")]
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub poll_interval: Duration,
    #[serde(default = "default_max_time")]
    #[serde_as(as = "DurationSeconds<u64>")]
    pub max_time: Duration,
    #[serde(default)]
    pub fail_on_timeout: bool,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            poll_interval: default_poll_interval(),
            max_time: default_max_time(),
            fail_on_timeout: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// When set, a daily rolling JSON log is written to this directory.
    #[serde(default)]
    pub directory: Option<PathBuf>,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    #[serde(default)]
    pub file_prefix: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: None,
            format: default_log_format(),
            file_prefix: None,
        }
    }
}
