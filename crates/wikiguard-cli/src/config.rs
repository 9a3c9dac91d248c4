//! Configuration: TOML file + CLI overrides.
//!
//! ```toml
//! [content]
//! root = "~/wiki"
//!
//! [throttle]
//! delay_max_ms = 10000
//! user_step_ms = 1000
//! addr_step_ms = 100
//! global_step_ms = 50
//! drop_after_secs = 3600
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use wikiguard_core::ThrottleConfig;

/// Top-level config file structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub content: ContentSection,
    #[serde(default)]
    pub throttle: ThrottleSection,
}

/// `[content]` section of the config TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentSection {
    #[serde(default = "default_root")]
    pub root: String,
}

impl Default for ContentSection {
    fn default() -> Self {
        Self {
            root: default_root(),
        }
    }
}

/// `[throttle]` section of the config TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct ThrottleSection {
    #[serde(default = "default_delay_max_ms")]
    pub delay_max_ms: u64,
    #[serde(default = "default_user_step_ms")]
    pub user_step_ms: u64,
    #[serde(default = "default_addr_step_ms")]
    pub addr_step_ms: u64,
    #[serde(default = "default_global_step_ms")]
    pub global_step_ms: u64,
    #[serde(default = "default_drop_after_secs")]
    pub drop_after_secs: u64,
}

impl Default for ThrottleSection {
    fn default() -> Self {
        Self {
            delay_max_ms: default_delay_max_ms(),
            user_step_ms: default_user_step_ms(),
            addr_step_ms: default_addr_step_ms(),
            global_step_ms: default_global_step_ms(),
            drop_after_secs: default_drop_after_secs(),
        }
    }
}

impl From<&ThrottleSection> for ThrottleConfig {
    fn from(section: &ThrottleSection) -> Self {
        ThrottleConfig {
            delay_max: Duration::from_millis(section.delay_max_ms),
            user_step: Duration::from_millis(section.user_step_ms),
            addr_step: Duration::from_millis(section.addr_step_ms),
            global_step: Duration::from_millis(section.global_step_ms),
            drop_after: Duration::from_secs(section.drop_after_secs),
        }
    }
}

fn default_root() -> String {
    ".".to_string()
}
fn default_delay_max_ms() -> u64 {
    10_000
}
fn default_user_step_ms() -> u64 {
    1_000
}
fn default_addr_step_ms() -> u64 {
    100
}
fn default_global_step_ms() -> u64 {
    50
}
fn default_drop_after_secs() -> u64 {
    3_600
}

/// Resolved configuration (paths expanded, CLI overrides applied).
#[derive(Debug, Clone)]
pub struct GuardConfig {
    pub content_root: PathBuf,
    pub throttle: ThrottleConfig,
}

impl GuardConfig {
    /// Load config from a TOML file, then apply CLI overrides.
    ///
    /// A missing file is not an error; defaults are used instead.
    pub fn load(config_path: &Path, cli_root: Option<&str>) -> Result<Self> {
        let expanded = expand_tilde(config_path);
        let file_config = if expanded.exists() {
            info!(path = %expanded.display(), "loading config file");
            let content = std::fs::read_to_string(&expanded)
                .with_context(|| format!("failed to read config at {}", expanded.display()))?;
            toml::from_str::<ConfigFile>(&content)
                .with_context(|| format!("failed to parse config at {}", expanded.display()))?
        } else {
            debug!(path = %expanded.display(), "config file not found, using defaults");
            ConfigFile::default()
        };

        let root = cli_root
            .map(|s| s.to_string())
            .unwrap_or(file_config.content.root);
        let throttle = ThrottleConfig::from(&file_config.throttle);
        throttle
            .validate()
            .context("invalid [throttle] section")?;

        Ok(Self {
            content_root: expand_tilde_str(&root),
            throttle,
        })
    }
}

/// Expand `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
    let s = path.to_string_lossy();
    expand_tilde_str(&s)
}

fn expand_tilde_str(s: &str) -> PathBuf {
    if let Some(rest) = s.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = ConfigFile::default();
        assert_eq!(cfg.content.root, ".");
        assert_eq!(cfg.throttle.delay_max_ms, 10_000);
        assert_eq!(cfg.throttle.user_step_ms, 1_000);
        assert_eq!(cfg.throttle.addr_step_ms, 100);
        assert_eq!(cfg.throttle.global_step_ms, 50);
        assert_eq!(cfg.throttle.drop_after_secs, 3_600);
    }

    #[test]
    fn parse_partial_toml_config() {
        let toml_str = r#"
[content]
root = "/srv/wiki"

[throttle]
user_step_ms = 250
"#;
        let cfg: ConfigFile = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.content.root, "/srv/wiki");
        assert_eq!(cfg.throttle.user_step_ms, 250);
        assert_eq!(cfg.throttle.delay_max_ms, 10_000); // default
    }

    #[test]
    fn throttle_section_converts_units() {
        let section = ThrottleSection {
            delay_max_ms: 5_000,
            user_step_ms: 500,
            addr_step_ms: 50,
            global_step_ms: 25,
            drop_after_secs: 120,
        };
        let throttle = ThrottleConfig::from(&section);
        assert_eq!(throttle.delay_max, Duration::from_secs(5));
        assert_eq!(throttle.user_step, Duration::from_millis(500));
        assert_eq!(throttle.drop_after, Duration::from_secs(120));
    }

    #[test]
    fn missing_file_uses_defaults_and_cli_root_wins() {
        let dir = tempfile::TempDir::new().unwrap();
        let cfg = GuardConfig::load(&dir.path().join("absent.toml"), Some("/srv/wiki")).unwrap();
        assert_eq!(cfg.content_root, PathBuf::from("/srv/wiki"));
        assert_eq!(cfg.throttle, ThrottleConfig::from(&ThrottleSection::default()));
    }

    #[test]
    fn file_values_are_loaded() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[content]\nroot = \"/data/pages\"\n[throttle]\ndelay_max_ms = 2000\n",
        )
        .unwrap();

        let cfg = GuardConfig::load(&path, None).unwrap();
        assert_eq!(cfg.content_root, PathBuf::from("/data/pages"));
        assert_eq!(cfg.throttle.delay_max, Duration::from_secs(2));
    }

    #[test]
    fn zero_drop_after_is_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[throttle]\ndrop_after_secs = 0\n").unwrap();

        assert!(GuardConfig::load(&path, None).is_err());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[throttle\n").unwrap();

        let err = GuardConfig::load(&path, None).unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse config"));
    }

    #[test]
    fn tilde_is_expanded() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde_str("~/wiki"), home.join("wiki"));
        }
        assert_eq!(expand_tilde_str("/abs/wiki"), PathBuf::from("/abs/wiki"));
    }
}
