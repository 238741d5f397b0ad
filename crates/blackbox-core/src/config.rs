//! Configuration for the Blackbox dashboard.
//!
//! Values come from the process environment, falling back to a `.env` file
//! in the working directory. Malformed values fall back to defaults with a
//! warning rather than failing startup.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::snap::DEFAULT_GRID_STEP;

/// Default number of undo entries kept per dashboard.
pub const DEFAULT_HISTORY_DEPTH: usize = 50;

/// Upper bound accepted for `BLACKBOX_HISTORY_DEPTH`.
pub const MAX_HISTORY_DEPTH: usize = 1000;

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Grid step every committed geometry snaps to.
    pub grid_step: f64,
    /// Maximum undo entries retained; the oldest is dropped beyond this.
    pub history_depth: usize,
    /// Directory holding the persisted namespaces.
    pub data_dir: PathBuf,
    /// Persist after every successful command.
    pub autosave: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grid_step: DEFAULT_GRID_STEP,
            history_depth: DEFAULT_HISTORY_DEPTH,
            data_dir: crate::paths::data_dir(),
            autosave: true,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let grid_step = match env_value("BLACKBOX_GRID_STEP") {
            Some(raw) => match raw.trim().parse::<f64>() {
                Ok(step) if step.is_finite() && step > 0.0 => step,
                _ => {
                    tracing::warn!(value = %raw, "ignoring invalid BLACKBOX_GRID_STEP");
                    defaults.grid_step
                }
            },
            None => defaults.grid_step,
        };

        let history_depth = env_usize("BLACKBOX_HISTORY_DEPTH", defaults.history_depth)
            .clamp(1, MAX_HISTORY_DEPTH);

        let data_dir = env_value("BLACKBOX_DATA_DIR")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map_or(defaults.data_dir, PathBuf::from);

        Self {
            grid_step,
            history_depth,
            data_dir,
            autosave: env_bool("BLACKBOX_AUTOSAVE", defaults.autosave),
        }
    }

    /// Replace the data directory (CLI `--data-dir`).
    #[must_use]
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }
}

// Helper functions for environment variable parsing

static DOTENV_VALUES: OnceLock<HashMap<String, String>> = OnceLock::new();

#[cfg(test)]
thread_local! {
    static TEST_ENV_OVERRIDES: std::cell::RefCell<HashMap<String, String>> =
        std::cell::RefCell::new(HashMap::new());
}

#[cfg(test)]
fn test_env_override_value(key: &str) -> Option<String> {
    TEST_ENV_OVERRIDES.with(|cell| cell.borrow().get(key).cloned())
}

fn dotenv_values() -> &'static HashMap<String, String> {
    DOTENV_VALUES.get_or_init(|| load_dotenv_file(Path::new(".env")))
}

/// Read a value from the real environment first, falling back to `.env`.
#[must_use]
pub fn env_value(key: &str) -> Option<String> {
    #[cfg(test)]
    if let Some(v) = test_env_override_value(key) {
        return Some(v);
    }
    env::var(key)
        .ok()
        .or_else(|| dotenv_values().get(key).cloned())
}

fn load_dotenv_file(path: &Path) -> HashMap<String, String> {
    let Ok(contents) = fs::read_to_string(path) else {
        return HashMap::new();
    };
    parse_dotenv_contents(&contents)
}

/// Parse `KEY=value` lines, skipping blanks, comments and `export ` prefixes.
#[must_use]
pub fn parse_dotenv_contents(contents: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for raw_line in contents.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        map.insert(key.to_string(), unquote(value.trim()).to_string());
    }
    map
}

fn unquote(raw: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = raw
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    raw
}

fn parse_bool(value: &str, default: bool) -> bool {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" | "on" => true,
        "0" | "false" | "f" | "no" | "n" | "off" => false,
        _ => default,
    }
}

fn env_bool(key: &str, default: bool) -> bool {
    env_value(key).map_or(default, |v| parse_bool(&v, default))
}

fn env_usize(key: &str, default: usize) -> usize {
    env_value(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestEnvOverrideGuard {
        previous: Vec<(String, Option<String>)>,
    }

    impl TestEnvOverrideGuard {
        fn set(vars: &[(&str, &str)]) -> Self {
            let mut previous = Vec::new();
            TEST_ENV_OVERRIDES.with(|cell| {
                let mut map = cell.borrow_mut();
                for (key, value) in vars {
                    let old = map.get(*key).cloned();
                    previous.push(((*key).to_string(), old));
                    map.insert((*key).to_string(), (*value).to_string());
                }
            });
            Self { previous }
        }
    }

    impl Drop for TestEnvOverrideGuard {
        fn drop(&mut self) {
            TEST_ENV_OVERRIDES.with(|cell| {
                let mut map = cell.borrow_mut();
                for (key, value) in self.previous.drain(..) {
                    match value {
                        Some(v) => {
                            map.insert(key, v);
                        }
                        None => {
                            map.remove(&key);
                        }
                    }
                }
            });
        }
    }

    #[test]
    fn defaults_match_canvas_conventions() {
        let config = Config::default();
        assert!((config.grid_step - 20.0).abs() < f64::EPSILON);
        assert_eq!(config.history_depth, 50);
        assert!(config.autosave);
        assert!(config.data_dir.ends_with("blackbox-dashboard"));
    }

    #[test]
    fn env_overrides_are_applied() {
        let _env = TestEnvOverrideGuard::set(&[
            ("BLACKBOX_GRID_STEP", "10"),
            ("BLACKBOX_HISTORY_DEPTH", "5"),
            ("BLACKBOX_DATA_DIR", "/tmp/bbx-test"),
            ("BLACKBOX_AUTOSAVE", "off"),
        ]);
        let config = Config::from_env();
        assert!((config.grid_step - 10.0).abs() < f64::EPSILON);
        assert_eq!(config.history_depth, 5);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/bbx-test"));
        assert!(!config.autosave);
    }

    #[test]
    fn invalid_grid_step_falls_back() {
        for bad in ["0", "-5", "abc", "NaN"] {
            let _env = TestEnvOverrideGuard::set(&[("BLACKBOX_GRID_STEP", bad)]);
            let config = Config::from_env();
            assert!((config.grid_step - DEFAULT_GRID_STEP).abs() < f64::EPSILON, "{bad}");
        }
    }

    #[test]
    fn history_depth_is_clamped() {
        {
            let _env = TestEnvOverrideGuard::set(&[("BLACKBOX_HISTORY_DEPTH", "0")]);
            assert_eq!(Config::from_env().history_depth, 1);
        }
        let _env = TestEnvOverrideGuard::set(&[("BLACKBOX_HISTORY_DEPTH", "999999")]);
        assert_eq!(Config::from_env().history_depth, MAX_HISTORY_DEPTH);
    }

    #[test]
    fn with_data_dir_overrides() {
        let config = Config::default().with_data_dir("/x/y");
        assert_eq!(config.data_dir, PathBuf::from("/x/y"));
    }

    #[test]
    fn parse_bool_variants() {
        assert!(parse_bool("YES", false));
        assert!(!parse_bool("0", true));
        assert!(parse_bool("maybe", true));
    }

    #[test]
    fn test_parse_dotenv_contents() {
        let contents = "# comment\nexport BLACKBOX_GRID_STEP=10\nBLACKBOX_DATA_DIR=\"/srv/bbx\"\n\nbogus line\n=novalue\n";
        let values = parse_dotenv_contents(contents);
        assert_eq!(values.get("BLACKBOX_GRID_STEP").map(String::as_str), Some("10"));
        assert_eq!(values.get("BLACKBOX_DATA_DIR").map(String::as_str), Some("/srv/bbx"));
        assert_eq!(values.len(), 2);
    }
}
