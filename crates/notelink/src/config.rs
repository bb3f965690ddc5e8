//! Runtime configuration.
//!
//! Precedence: defaults < TOML file < environment < command-line flags. The
//! environment layer is handled by clap (`env = ...` on the flags), so this
//! module only merges a file with `Overrides` and validates the result.

use notelink_core::scanner::DEFAULT_SKIP_PREFIXES;
use notelink_core::SnippetOptions;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("configuration error:\n{}", bullet_list(.0))]
    Invalid(Vec<String>),
}

fn bullet_list(problems: &[String]) -> String {
    problems
        .iter()
        .map(|p| format!("  - {p}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Contents of `notelink.toml`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub vault_dir: Option<PathBuf>,
    pub bind: Option<String>,
    pub snippet: SnippetOptions,
    pub scan: ScanConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    /// Directory-name prefixes left out of the scan.
    pub skip_prefixes: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            skip_prefixes: DEFAULT_SKIP_PREFIXES.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// Values supplied on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub vault_dir: Option<PathBuf>,
    pub bind: Option<String>,
}

/// Validated settings the server runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Canonical vault root.
    pub vault_dir: PathBuf,
    pub bind: SocketAddr,
    pub snippet: SnippetOptions,
    pub skip_prefixes: Vec<String>,
}

impl Config {
    /// Load and validate, reading `file` if one is given.
    pub fn load(file: Option<&Path>, overrides: Overrides) -> Result<Settings, ConfigError> {
        let config = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.with_overrides(overrides).validate()
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(vault_dir) = overrides.vault_dir {
            self.vault_dir = Some(vault_dir);
        }
        if let Some(bind) = overrides.bind {
            self.bind = Some(bind);
        }
        self
    }

    /// Check every field and report all problems at once.
    pub fn validate(self) -> Result<Settings, ConfigError> {
        let mut problems = Vec::new();

        let vault_dir = match &self.vault_dir {
            None => {
                problems.push(
                    "vault_dir is not set; pass --vault-dir, set VAULT_DIR, or add it to the config file"
                        .to_string(),
                );
                None
            }
            Some(dir) if !dir.exists() => {
                problems.push(format!("vault_dir {} does not exist", dir.display()));
                None
            }
            Some(dir) if !dir.is_dir() => {
                problems.push(format!("vault_dir {} is not a directory", dir.display()));
                None
            }
            Some(dir) => match dir.canonicalize() {
                Ok(dir) => Some(dir),
                Err(e) => {
                    problems.push(format!("vault_dir {} cannot be resolved: {e}", dir.display()));
                    None
                }
            },
        };

        let bind_raw = self.bind.as_deref().unwrap_or(DEFAULT_BIND);
        let bind = match bind_raw.parse::<SocketAddr>() {
            Ok(addr) => Some(addr),
            Err(e) => {
                problems.push(format!("bind address {bind_raw:?} is invalid: {e}"));
                None
            }
        };

        if self.snippet.max_chars == 0 {
            problems.push("snippet.max_chars must be greater than zero".to_string());
        }
        if self.scan.skip_prefixes.iter().any(|p| p.is_empty()) {
            problems.push("scan.skip_prefixes must not contain empty prefixes".to_string());
        }

        match (vault_dir, bind) {
            (Some(vault_dir), Some(bind)) if problems.is_empty() => Ok(Settings {
                vault_dir,
                bind,
                snippet: self.snippet,
                skip_prefixes: self.scan.skip_prefixes,
            }),
            _ => Err(ConfigError::Invalid(problems)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn problems(err: ConfigError) -> Vec<String> {
        match err {
            ConfigError::Invalid(problems) => problems,
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn parses_full_file() {
        let config: Config = toml::from_str(
            r#"
            vault_dir = "/srv/vault"
            bind = "0.0.0.0:9000"

            [snippet]
            context_chars = 20
            mark = true

            [scan]
            skip_prefixes = [".", "_", "archive"]
            "#,
        )
        .unwrap();

        assert_eq!(config.vault_dir, Some(PathBuf::from("/srv/vault")));
        assert_eq!(config.bind.as_deref(), Some("0.0.0.0:9000"));
        assert_eq!(config.snippet.context_chars, 20);
        assert_eq!(config.snippet.max_chars, SnippetOptions::default().max_chars);
        assert!(config.snippet.mark);
        assert_eq!(config.scan.skip_prefixes, vec![".", "_", "archive"]);
    }

    #[test]
    fn empty_file_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.scan.skip_prefixes, vec![".", "_"]);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<Config>("vault = \"/x\"").is_err());
    }

    #[test]
    fn overrides_win_over_file() {
        let config = Config {
            vault_dir: Some("/from/file".into()),
            bind: Some("127.0.0.1:1".into()),
            ..Config::default()
        }
        .with_overrides(Overrides {
            vault_dir: Some("/from/flag".into()),
            bind: None,
        });

        assert_eq!(config.vault_dir, Some(PathBuf::from("/from/flag")));
        assert_eq!(config.bind.as_deref(), Some("127.0.0.1:1"));
    }

    #[test]
    fn valid_config_produces_settings() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Config {
            vault_dir: Some(dir.path().to_path_buf()),
            ..Config::default()
        }
        .validate()
        .unwrap();

        assert_eq!(settings.vault_dir, dir.path().canonicalize().unwrap());
        assert_eq!(settings.bind, DEFAULT_BIND.parse::<SocketAddr>().unwrap());
        assert_eq!(settings.snippet, SnippetOptions::default());
    }

    #[test]
    fn all_problems_are_reported_together() {
        let config = Config {
            vault_dir: None,
            bind: Some("not an address".into()),
            snippet: SnippetOptions {
                max_chars: 0,
                ..SnippetOptions::default()
            },
            scan: ScanConfig {
                skip_prefixes: vec![String::new()],
            },
        };
        let problems = problems(config.validate().unwrap_err());
        assert_eq!(problems.len(), 4, "{problems:#?}");
        assert!(problems[0].contains("vault_dir is not set"));
        assert!(problems[1].contains("not an address"));
    }

    #[test]
    fn missing_vault_dir_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            vault_dir: Some(dir.path().join("nope")),
            ..Config::default()
        };
        let problems = problems(config.validate().unwrap_err());
        assert!(problems[0].contains("does not exist"));
    }

    #[test]
    fn file_as_vault_dir_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("note.md");
        std::fs::write(&file, "x").unwrap();
        let config = Config {
            vault_dir: Some(file),
            ..Config::default()
        };
        let problems = problems(config.validate().unwrap_err());
        assert!(problems[0].contains("is not a directory"));
    }

    #[test]
    fn load_reads_toml_file() {
        let vault = tempfile::tempdir().unwrap();
        let conf_dir = tempfile::tempdir().unwrap();
        let conf = conf_dir.path().join("notelink.toml");
        std::fs::write(
            &conf,
            format!(
                "vault_dir = {:?}\nbind = \"127.0.0.1:0\"\n",
                vault.path().to_str().unwrap()
            ),
        )
        .unwrap();

        let settings = Config::load(Some(&conf), Overrides::default()).unwrap();
        assert_eq!(settings.vault_dir, vault.path().canonicalize().unwrap());
        assert_eq!(settings.bind.port(), 0);
    }

    #[test]
    fn load_reports_parse_errors() {
        let conf_dir = tempfile::tempdir().unwrap();
        let conf = conf_dir.path().join("bad.toml");
        std::fs::write(&conf, "vault_dir = [").unwrap();
        assert!(matches!(
            Config::load(Some(&conf), Overrides::default()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn error_message_lists_problems() {
        let message = ConfigError::Invalid(vec!["a".into(), "b".into()]).to_string();
        assert_eq!(message, "configuration error:\n  - a\n  - b");
    }
}
