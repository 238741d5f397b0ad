//! XDG Base Directory compliant path resolution.
//!
//! - Data: `~/.local/share/blackbox-dashboard/` (or `$XDG_DATA_HOME/blackbox-dashboard/`)
//! - Config: `~/.config/blackbox-dashboard/` (or `$XDG_CONFIG_HOME/blackbox-dashboard/`)
//!
//! On Windows, `%LOCALAPPDATA%` and `%APPDATA%` are used instead.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "blackbox-dashboard";

/// Returns the data directory holding the persisted dashboard namespaces.
///
/// Priority order:
/// 1. `$XDG_DATA_HOME/blackbox-dashboard/` (if XDG_DATA_HOME is set)
/// 2. `~/.local/share/blackbox-dashboard/` (default)
/// 3. `%LOCALAPPDATA%/blackbox-dashboard/` (Windows)
#[must_use]
pub fn data_dir() -> PathBuf {
    if let Some(xdg_data) = non_empty_env("XDG_DATA_HOME") {
        return PathBuf::from(xdg_data).join(APP_DIR);
    }

    #[cfg(target_os = "windows")]
    {
        if let Some(local_app_data) = dirs::data_local_dir() {
            return local_app_data.join(APP_DIR);
        }
    }

    #[cfg(not(target_os = "windows"))]
    {
        if let Some(home) = dirs::home_dir() {
            return home.join(".local").join("share").join(APP_DIR);
        }
    }

    PathBuf::from(".local/share").join(APP_DIR)
}

/// Returns the configuration directory.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Some(xdg_config) = non_empty_env("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg_config).join(APP_DIR);
    }

    #[cfg(target_os = "windows")]
    {
        if let Some(app_data) = dirs::config_dir() {
            return app_data.join(APP_DIR);
        }
    }

    #[cfg(not(target_os = "windows"))]
    {
        if let Some(home) = dirs::home_dir() {
            return home.join(".config").join(APP_DIR);
        }
    }

    PathBuf::from(".config").join(APP_DIR)
}

/// File backing a persisted namespace (`<dir>/<namespace>.json`).
#[must_use]
pub fn namespace_file(dir: &Path, namespace: &str) -> PathBuf {
    dir.join(format!("{namespace}.json"))
}

/// Create `dir` (and parents) if missing.
///
/// # Errors
///
/// Propagates the underlying I/O error.
pub fn ensure_dir(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir)
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_dir_ends_with_app_name() {
        assert!(data_dir().ends_with(APP_DIR));
        assert!(config_dir().ends_with(APP_DIR));
    }

    #[test]
    fn namespace_file_appends_json() {
        let path = namespace_file(Path::new("/data"), "tbb-widgets");
        assert_eq!(path, PathBuf::from("/data/tbb-widgets.json"));
    }

    #[test]
    fn ensure_dir_creates_nested() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a").join("b");
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
    }
}
