use std::path::{Path, PathBuf};

use crate::config::PathsConfig;

/// Per-user and system base directories the built-in targets are laid out under.
/// Resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseDirs {
    pub home: PathBuf,
    /// `%LOCALAPPDATA%`
    pub local_app_data: PathBuf,
    /// `%APPDATA%`
    pub roaming_app_data: PathBuf,
    pub temp: PathBuf,
    /// `%SystemRoot%`
    pub system_root: PathBuf,
    /// `%ProgramData%`
    pub program_data: PathBuf,
}

impl BaseDirs {
    /// Resolve every directory: config override first, then the environment, then a
    /// location derived from the home directory.
    pub fn resolve(overrides: &PathsConfig) -> Self {
        let home = overrides
            .home
            .clone()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        let local_app_data = overrides
            .local_app_data
            .clone()
            .or_else(|| env_dir("LOCALAPPDATA"))
            .unwrap_or_else(|| home.join("AppData").join("Local"));

        let roaming_app_data = overrides
            .roaming_app_data
            .clone()
            .or_else(|| env_dir("APPDATA"))
            .unwrap_or_else(|| home.join("AppData").join("Roaming"));

        let temp = overrides.temp.clone().unwrap_or_else(std::env::temp_dir);

        let system_root = overrides
            .system_root
            .clone()
            .or_else(|| env_dir("SystemRoot"))
            .unwrap_or_else(|| PathBuf::from(r"C:\Windows"));

        let program_data = overrides
            .program_data
            .clone()
            .or_else(|| env_dir("ProgramData"))
            .unwrap_or_else(|| PathBuf::from(r"C:\ProgramData"));

        Self {
            home,
            local_app_data,
            roaming_app_data,
            temp,
            system_root,
            program_data,
        }
    }
}

fn env_dir(var: &str) -> Option<PathBuf> {
    std::env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Join path components one by one so the platform separator is used throughout.
pub(crate) fn under(base: &Path, parts: &[&str]) -> PathBuf {
    parts.iter().fold(base.to_path_buf(), |acc, part| acc.join(part))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_win() {
        let overrides = PathsConfig {
            home: Some(PathBuf::from("/h")),
            local_app_data: Some(PathBuf::from("/l")),
            roaming_app_data: Some(PathBuf::from("/r")),
            temp: Some(PathBuf::from("/t")),
            system_root: Some(PathBuf::from("/s")),
            program_data: Some(PathBuf::from("/p")),
        };
        let dirs = BaseDirs::resolve(&overrides);
        assert_eq!(dirs.home, PathBuf::from("/h"));
        assert_eq!(dirs.local_app_data, PathBuf::from("/l"));
        assert_eq!(dirs.roaming_app_data, PathBuf::from("/r"));
        assert_eq!(dirs.temp, PathBuf::from("/t"));
        assert_eq!(dirs.system_root, PathBuf::from("/s"));
        assert_eq!(dirs.program_data, PathBuf::from("/p"));
    }

    #[test]
    fn test_resolve_without_overrides_is_absolute_or_fallback() {
        let dirs = BaseDirs::resolve(&PathsConfig::default());
        assert!(!dirs.temp.as_os_str().is_empty());
        assert!(!dirs.local_app_data.as_os_str().is_empty());
    }

    #[test]
    fn test_under_joins_components() {
        let path = under(Path::new("/base"), &["Google", "Chrome", "User Data"]);
        assert_eq!(
            path,
            Path::new("/base").join("Google").join("Chrome").join("User Data")
        );
    }
}
