use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::targets::SafetyClass;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub shell: ShellConfig,
    pub paths: PathsConfig,
    pub targets: TargetsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Program used for trash queries (invoked with `-Command <script>`)
    pub program: String,
    /// Hard timeout for a single invocation, in seconds
    pub timeout_secs: u64,
}

/// Overrides for the per-user base directories. Unset entries are resolved from the
/// environment at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub home: Option<PathBuf>,
    pub local_app_data: Option<PathBuf>,
    pub roaming_app_data: Option<PathBuf>,
    pub temp: Option<PathBuf>,
    pub system_root: Option<PathBuf>,
    pub program_data: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetsConfig {
    /// Include the built-in target list
    pub builtin: bool,
    /// Target ids to drop from the registry
    pub exclude: Vec<String>,
    /// Additional user-declared targets, appended after the built-in ones
    pub custom: Vec<CustomTarget>,
}

/// Sizing/deletion method available to user-declared targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CustomMethod {
    PlainDirectory,
    MultiProfileCache,
    PatternMatch,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomTarget {
    pub id: String,
    pub label: String,
    #[serde(default = "default_safety")]
    pub safety: SafetyClass,
    pub method: CustomMethod,
    pub path: PathBuf,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub hint: String,
}

fn default_safety() -> SafetyClass {
    SafetyClass::Optional
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            program: "powershell".to_string(),
            timeout_secs: 60,
        }
    }
}

impl Default for TargetsConfig {
    fn default() -> Self {
        Self {
            builtin: true,
            exclude: vec![],
            custom: vec![],
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist and parse. Without one, the per-user config file is
    /// used when present, otherwise defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.is_file()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Location of the per-user configuration file.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("cache-sweeper").join("config.toml"))
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check values that serde cannot express. Target id uniqueness is checked when the
    /// registry is assembled, since it depends on the built-in list.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shell.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "shell.timeout_secs must be greater than 0".into(),
            ));
        }

        if self.shell.program.trim().is_empty() {
            return Err(ConfigError::Invalid("shell.program must not be empty".into()));
        }

        for custom in &self.targets.custom {
            if custom.id.trim().is_empty() {
                return Err(ConfigError::Invalid("custom target id must not be empty".into()));
            }

            match (custom.method, &custom.pattern) {
                (CustomMethod::PatternMatch, None) => {
                    return Err(ConfigError::Invalid(format!(
                        "custom target '{}' uses pattern-match but has no pattern",
                        custom.id
                    )));
                }
                (CustomMethod::PlainDirectory | CustomMethod::MultiProfileCache, Some(_)) => {
                    return Err(ConfigError::Invalid(format!(
                        "custom target '{}' sets a pattern but does not use pattern-match",
                        custom.id
                    )));
                }
                _ => {}
            }
        }

        Ok(())
    }
}
