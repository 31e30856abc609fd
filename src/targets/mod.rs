//! Cleanable locations and the registry that lists them.
//!
//! A [`Target`] pairs a stable id with a [`Method`], the closed set of storage shapes
//! the engine knows how to size and empty. The [`Registry`] is assembled once from the
//! built-in list and user configuration and then only read.

mod builtin;
mod paths;

pub use builtin::builtin_targets;
pub use paths::BaseDirs;

use glob::{MatchOptions, Pattern};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::{CustomMethod, CustomTarget, TargetsConfig};
use crate::error::{ConfigError, SweeperError};

/// Advisory classification shown to whoever picks targets. Not enforced by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SafetyClass {
    /// Only side effect is a slower first use after deletion.
    Safe,
    /// May need elevated privileges or has a vaguer blast radius.
    Optional,
}

impl fmt::Display for SafetyClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SafetyClass::Safe => f.pad("safe"),
            SafetyClass::Optional => f.pad("optional"),
        }
    }
}

/// Case-insensitive file-name glob such as `thumbcache*.db`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePattern(Pattern);

impl FilePattern {
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        Pattern::new(pattern)
            .map(Self)
            .map_err(|e| ConfigError::Invalid(format!("invalid pattern '{}': {}", pattern, e)))
    }

    pub fn matches(&self, file_name: &str) -> bool {
        let options = MatchOptions {
            case_sensitive: false,
            require_literal_separator: false,
            require_literal_leading_dot: false,
        };
        self.0.matches_with(file_name, options)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Serialize for FilePattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// How a target is sized and emptied. Each variant carries exactly the locator it needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "method", rename_all = "camelCase")]
pub enum Method {
    /// Everything below `path`; the directory itself is kept.
    PlainDirectory { path: PathBuf },
    /// `path` holds one sub-directory per browser profile, each with a `cache2` directory.
    MultiProfileCache { path: PathBuf },
    /// Immediate files of `path` whose name matches `pattern`.
    PatternMatch { path: PathBuf, pattern: FilePattern },
    /// The OS recycle bin, reached through the external shell.
    SystemTrash,
}

impl Method {
    /// Short name used in listings.
    pub fn name(&self) -> &'static str {
        match self {
            Method::PlainDirectory { .. } => "plainDirectory",
            Method::MultiProfileCache { .. } => "multiProfileCache",
            Method::PatternMatch { .. } => "patternMatch",
            Method::SystemTrash => "systemTrash",
        }
    }
}

/// One declared cleanable location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub id: String,
    pub label: String,
    pub safety_class: SafetyClass,
    #[serde(flatten)]
    pub method: Method,
    pub hint: String,
}

impl Target {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        safety_class: SafetyClass,
        method: Method,
        hint: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            safety_class,
            method,
            hint: hint.into(),
        }
    }

    /// Location on disk; `None` for the system trash.
    pub fn path(&self) -> Option<&Path> {
        match &self.method {
            Method::PlainDirectory { path }
            | Method::MultiProfileCache { path }
            | Method::PatternMatch { path, .. } => Some(path),
            Method::SystemTrash => None,
        }
    }
}

impl TryFrom<&CustomTarget> for Target {
    type Error = ConfigError;

    fn try_from(custom: &CustomTarget) -> Result<Self, Self::Error> {
        let path = custom.path.clone();
        let method = match custom.method {
            CustomMethod::PlainDirectory => Method::PlainDirectory { path },
            CustomMethod::MultiProfileCache => Method::MultiProfileCache { path },
            CustomMethod::PatternMatch => {
                let pattern = custom.pattern.as_deref().ok_or_else(|| {
                    ConfigError::Invalid(format!("custom target '{}' has no pattern", custom.id))
                })?;
                Method::PatternMatch {
                    path,
                    pattern: FilePattern::new(pattern)?,
                }
            }
        };

        Ok(Target::new(
            custom.id.clone(),
            custom.label.clone(),
            custom.safety,
            method,
            custom.hint.clone(),
        ))
    }
}

/// Ordered, id-unique list of targets.
///
/// Order is significant: it drives scan order, report order and the progress denominator.
#[derive(Debug, Clone)]
pub struct Registry {
    targets: Vec<Target>,
}

impl Registry {
    /// Assemble the registry from the built-in list and user configuration.
    pub fn new(dirs: &BaseDirs, config: &TargetsConfig) -> Result<Self, ConfigError> {
        let mut targets = if config.builtin {
            builtin_targets(dirs)?
        } else {
            Vec::new()
        };

        for custom in &config.custom {
            targets.push(Target::try_from(custom)?);
        }

        if !config.exclude.is_empty() {
            let excluded: HashSet<&str> = config.exclude.iter().map(String::as_str).collect();
            targets.retain(|t| !excluded.contains(t.id.as_str()));
        }

        Self::from_targets(targets)
    }

    /// Build a registry from an explicit list, rejecting duplicate ids.
    pub fn from_targets(targets: Vec<Target>) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        for target in &targets {
            if !seen.insert(target.id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate target id '{}'",
                    target.id
                )));
            }
        }

        Ok(Self { targets })
    }

    /// Fresh copy of all targets in registry order.
    pub fn list_targets(&self) -> Vec<Target> {
        self.targets.clone()
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Get a target by id.
    pub fn get(&self, id: &str) -> Option<&Target> {
        self.targets.iter().find(|t| t.id == id)
    }

    /// Like [`Registry::get`], but an unknown id is an error.
    pub fn require(&self, id: &str) -> Result<&Target, SweeperError> {
        self.get(id)
            .ok_or_else(|| SweeperError::UnknownTarget(id.to_string()))
    }

    /// All ids in registry order.
    pub fn ids(&self) -> Vec<&str> {
        self.targets.iter().map(|t| t.id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
