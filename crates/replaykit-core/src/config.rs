//! Configuration types for replaykit.
//!
//! Settings are plain values handed to each constructor (`Verifier`,
//! `GoldenStore`, `MockTransport`). [`VerifyConfig::global`] offers the
//! process-wide defaults, loaded once from the environment and never
//! mutated afterwards.

use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{Error, Result};

/// Environment variable naming an optional YAML configuration file.
pub const ENV_CONFIG: &str = "REPLAYKIT_CONFIG";
/// Record mode for golden files.
pub const ENV_UPDATE_GOLDEN: &str = "REPLAYKIT_UPDATE_GOLDEN";
/// Root directory for golden files.
pub const ENV_GOLDEN_DIR: &str = "REPLAYKIT_GOLDEN_DIR";
/// Record mode for HTTP fixtures.
pub const ENV_UPDATE_MOCK_HTTP: &str = "REPLAYKIT_UPDATE_MOCK_HTTP";
/// Root directory for HTTP fixtures.
pub const ENV_MOCK_HTTP_DIR: &str = "REPLAYKIT_MOCK_HTTP_DIR";
/// Plain diff rendering.
pub const ENV_SHOW_DIFF: &str = "REPLAYKIT_SHOW_DIFF";
/// Colorized diff rendering.
pub const ENV_SHOW_DIFF_COLOR: &str = "REPLAYKIT_SHOW_DIFF_COLOR";
/// Diff rendering with non-printable characters made visible.
pub const ENV_SHOW_DIFF_NONPRINTABLE: &str = "REPLAYKIT_SHOW_DIFF_NONPRINTABLE";

const DEFAULT_DIR: &str = "./testdata";

lazy_static! {
    static ref GLOBAL: VerifyConfig = VerifyConfig::from_env().unwrap_or_else(|e| {
        warn!("Ignoring invalid replaykit environment configuration: {}", e);
        VerifyConfig::default()
    });
}

/// Complete replaykit configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct VerifyConfig {
    /// Golden file settings
    pub golden: GoldenSettings,
    /// Mock HTTP transport settings
    pub mock_http: MockHttpSettings,
    /// Failure diff rendering settings
    pub diff: DiffSettings,
}

impl VerifyConfig {
    /// Process-wide defaults, loaded once from the environment.
    pub fn global() -> &'static VerifyConfig {
        &GLOBAL
    }

    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::read(path, e))?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: VerifyConfig =
            serde_yaml::from_str(yaml).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Build configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// The file named by [`ENV_CONFIG`] is loaded first; individual variables
    /// override it.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup(ENV_CONFIG) {
            Some(path) if !path.trim().is_empty() => {
                debug!("Loading replaykit configuration from {}", path);
                Self::from_file(path.trim())?
            }
            _ => Self::default(),
        };

        if let Some(v) = lookup(ENV_UPDATE_GOLDEN) {
            config.golden.update = parse_flag(ENV_UPDATE_GOLDEN, &v)?;
        }
        if let Some(v) = lookup(ENV_GOLDEN_DIR) {
            config.golden.dir = PathBuf::from(v);
        }
        if let Some(v) = lookup(ENV_UPDATE_MOCK_HTTP) {
            config.mock_http.update = parse_flag(ENV_UPDATE_MOCK_HTTP, &v)?;
        }
        if let Some(v) = lookup(ENV_MOCK_HTTP_DIR) {
            config.mock_http.dir = PathBuf::from(v);
        }
        if let Some(v) = lookup(ENV_SHOW_DIFF) {
            config.diff.show = parse_flag(ENV_SHOW_DIFF, &v)?;
        }
        if let Some(v) = lookup(ENV_SHOW_DIFF_COLOR) {
            config.diff.color = parse_flag(ENV_SHOW_DIFF_COLOR, &v)?;
        }
        if let Some(v) = lookup(ENV_SHOW_DIFF_NONPRINTABLE) {
            config.diff.nonprintable = parse_flag(ENV_SHOW_DIFF_NONPRINTABLE, &v)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.golden.dir.as_os_str().is_empty() {
            return Err(Error::Config("golden.dir cannot be empty".to_string()));
        }

        if self.mock_http.dir.as_os_str().is_empty() {
            return Err(Error::Config("mock_http.dir cannot be empty".to_string()));
        }

        Ok(())
    }
}

/// Golden file settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GoldenSettings {
    /// Rewrite golden files from the current output before comparing
    pub update: bool,
    /// Root directory hosting golden files
    pub dir: PathBuf,
}

impl Default for GoldenSettings {
    fn default() -> Self {
        Self {
            update: false,
            dir: PathBuf::from(DEFAULT_DIR),
        }
    }
}

impl GoldenSettings {
    /// Settings rooted at `dir` in replay mode.
    pub fn replay(dir: impl Into<PathBuf>) -> Self {
        Self {
            update: false,
            dir: dir.into(),
        }
    }

    /// Settings rooted at `dir` in update mode.
    pub fn update(dir: impl Into<PathBuf>) -> Self {
        Self {
            update: true,
            dir: dir.into(),
        }
    }
}

/// Mock HTTP transport settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MockHttpSettings {
    /// Perform real requests and rewrite fixtures before serving them
    pub update: bool,
    /// Root directory hosting HTTP response fixtures
    pub dir: PathBuf,
}

impl Default for MockHttpSettings {
    fn default() -> Self {
        Self {
            update: false,
            dir: PathBuf::from(DEFAULT_DIR),
        }
    }
}

impl MockHttpSettings {
    /// Settings rooted at `dir` in replay mode.
    pub fn replay(dir: impl Into<PathBuf>) -> Self {
        Self {
            update: false,
            dir: dir.into(),
        }
    }

    /// Settings rooted at `dir` in record mode.
    pub fn record(dir: impl Into<PathBuf>) -> Self {
        Self {
            update: true,
            dir: dir.into(),
        }
    }
}

/// How failure diffs are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffStyle {
    /// No computed delta, both sides printed verbatim
    #[default]
    Off,
    /// Side-by-side table with delta markers
    Plain,
    /// Side-by-side table with ANSI colors and rune-level highlights
    Color,
    /// Side-by-side table with whitespace and control characters made visible
    Visible,
}

/// Failure diff rendering settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct DiffSettings {
    /// Show a plain diff
    pub show: bool,
    /// Show a colorized diff
    pub color: bool,
    /// Show a diff with non-printable characters made visible
    pub nonprintable: bool,
}

impl DiffSettings {
    /// Resolve the flags into a single style. The most specific flag wins.
    pub fn style(&self) -> DiffStyle {
        if self.color {
            DiffStyle::Color
        } else if self.nonprintable {
            DiffStyle::Visible
        } else if self.show {
            DiffStyle::Plain
        } else {
            DiffStyle::Off
        }
    }
}

impl From<DiffStyle> for DiffSettings {
    fn from(style: DiffStyle) -> Self {
        Self {
            show: style != DiffStyle::Off,
            color: style == DiffStyle::Color,
            nonprintable: style == DiffStyle::Visible,
        }
    }
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" | "off" => Ok(false),
        "1" | "true" | "yes" | "on" => Ok(true),
        other => Err(Error::Config(format!(
            "{name} must be a boolean, got '{other}'"
        ))),
    }
}
