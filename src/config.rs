use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

use crate::error::ImportError;
use crate::ingest::archive::{SelectorKind, MAX_ENTRY_BYTES};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "POSTIMPORT_CONFIG";

/// Config file used when the environment variable is unset.
pub const DEFAULT_CONFIG_FILE: &str = "postimport.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub import: ImportConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Import behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct ImportConfig {
    /// Default file name filter for directory imports.
    #[serde(default)]
    pub pattern: Option<String>,
    /// Archive entry selector: `all`, `text` or `top-level`.
    #[serde(default = "default_selector")]
    pub selector: String,
    /// Archive entries larger than this are skipped.
    #[serde(default = "default_max_entry_bytes")]
    pub max_entry_bytes: u64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            pattern: None,
            selector: default_selector(),
            max_entry_bytes: default_max_entry_bytes(),
            log_level: default_log_level(),
        }
    }
}

/// JSON output settings
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: default_pretty(),
        }
    }
}

fn default_selector() -> String {
    SelectorKind::All.as_str().to_string()
}

fn default_max_entry_bytes() -> u64 {
    MAX_ENTRY_BYTES
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_pretty() -> bool {
    true
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in POSTIMPORT_CONFIG environment variable (must exist)
    /// 2. ./postimport.toml in current directory (defaults are used if absent)
    pub fn load() -> Result<Self> {
        // Load .env file if it exists (ignore errors - file is optional)
        let _ = dotenv::dotenv();

        let config = match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(&PathBuf::from(path))?,
            Err(_) => {
                let path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    Config::default()
                }
            }
        };

        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &std::path::Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Validate configuration values
    fn validate(&self) -> crate::error::Result<()> {
        self.selector_kind()?;

        if self.import.max_entry_bytes == 0 {
            return Err(ImportError::Config(
                "import.max_entry_bytes must be greater than 0".to_string(),
            ));
        }

        if let Some(pattern) = &self.import.pattern {
            regex::Regex::new(pattern).map_err(|e| {
                ImportError::Config(format!("import.pattern is not a valid regex: {}", e))
            })?;
        }

        Ok(())
    }

    /// The configured archive selector
    pub fn selector_kind(&self) -> crate::error::Result<SelectorKind> {
        self.import
            .selector
            .parse::<SelectorKind>()
            .map_err(|e| ImportError::Config(format!("import.selector: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Serialize config tests that mutate process-wide cwd and env so they don't race.
    static CONFIG_TEST_LOCK: Mutex<()> = Mutex::new(());

    const TEST_CONFIG: &str = r#"
[import]
pattern = "\\.(md|txt)$"
selector = "text"
max_entry_bytes = 1024
log_level = "debug"

[output]
pretty = false
"#;

    /// Restores cwd when dropped (e.g. on panic).
    struct CwdGuard(std::path::PathBuf);
    impl Drop for CwdGuard {
        fn drop(&mut self) {
            let _ = std::env::set_current_dir(&self.0);
        }
    }

    fn with_config_env(config_path: Option<&std::path::Path>, f: impl FnOnce()) {
        let original = std::env::var(CONFIG_ENV).ok();
        match config_path {
            Some(p) => std::env::set_var(CONFIG_ENV, p),
            None => std::env::remove_var(CONFIG_ENV),
        }
        f();
        std::env::remove_var(CONFIG_ENV);
        if let Some(val) = original {
            std::env::set_var(CONFIG_ENV, val);
        }
    }

    #[test]
    fn test_config_load_success() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("custom.toml");
        fs::write(&config_path, TEST_CONFIG).unwrap();

        with_config_env(Some(&config_path), || {
            let config = Config::load();
            assert!(config.is_ok(), "Config::load() failed: {:?}", config.err());
            let config = config.unwrap();
            assert_eq!(config.import.pattern.as_deref(), Some(r"\.(md|txt)$"));
            assert_eq!(config.selector_kind().unwrap(), SelectorKind::Text);
            assert_eq!(config.import.max_entry_bytes, 1024);
            assert_eq!(config.import.log_level, "debug");
            assert!(!config.output.pretty);
        });
    }

    #[test]
    fn test_config_defaults_without_file() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let original_dir = std::env::current_dir().unwrap();
        let _cwd = CwdGuard(original_dir);
        std::env::set_current_dir(temp_dir.path()).unwrap();

        with_config_env(None, || {
            let config = Config::load().unwrap();
            assert_eq!(config.import.pattern, None);
            assert_eq!(config.selector_kind().unwrap(), SelectorKind::All);
            assert_eq!(config.import.max_entry_bytes, MAX_ENTRY_BYTES);
            assert_eq!(config.import.log_level, "info");
            assert!(config.output.pretty);
        });
    }

    #[test]
    fn test_config_partial_file() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(DEFAULT_CONFIG_FILE), "[output]\npretty = false\n").unwrap();
        let original_dir = std::env::current_dir().unwrap();
        let _cwd = CwdGuard(original_dir);
        std::env::set_current_dir(temp_dir.path()).unwrap();

        with_config_env(None, || {
            let config = Config::load().unwrap();
            assert!(!config.output.pretty);
            assert_eq!(config.import.selector, "all");
        });
    }

    #[test]
    fn test_config_invalid_values() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let cases = [
            ("[import]\nselector = \"everything\"\n", "import.selector"),
            ("[import]\nmax_entry_bytes = 0\n", "max_entry_bytes"),
            ("[import]\npattern = \"(\"\n", "import.pattern"),
        ];
        for (contents, expected) in cases {
            let config_path = temp_dir.path().join("bad.toml");
            fs::write(&config_path, contents).unwrap();
            with_config_env(Some(&config_path), || {
                let err = Config::load().unwrap_err();
                assert!(err.to_string().contains(expected), "{}", err);
                assert!(matches!(
                    err.downcast_ref::<ImportError>(),
                    Some(ImportError::Config(_))
                ));
            });
        }
    }

    #[test]
    fn test_config_invalid_path() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        with_config_env(Some(std::path::Path::new("nonexistent.toml")), || {
            let config = Config::load();
            assert!(config.is_err());
        });
    }
}
