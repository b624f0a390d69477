//! Configuration file parsing and management.
//!
//! This module handles loading configuration from TOML files, reading the
//! `DA_*` environment variables and merging both with proper precedence
//! rules. Applying the result to a [`RunConfig`](crate::RunConfig) is left to
//! the caller.

use crate::error::DomainAvailError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration loaded from TOML files.
///
/// ```toml
/// [defaults]
/// tld = "in.th"
/// input = "res/input-all.yaml"
/// chunk_size = 5
/// retry = 8
///
/// [api]
/// base_url = "https://services.pathosting.co.th"
/// timeout = "10s"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FileConfig {
    /// Default values for CLI options
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,

    /// Registrar API settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api: Option<ApiFileConfig>,
}

/// Default configuration values that map to CLI options.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DefaultsConfig {
    /// TLD for names given as arguments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tld: Option<String>,

    /// YAML input file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,

    /// Directory for generated output files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,

    /// Names per registrar request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_size: Option<usize>,

    /// Retry budget of each registrar request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ApiFileConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_aftermarket: Option<bool>,

    /// Request timeout (as string, e.g., "5s", "2m")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
}

/// Configuration discovery and loading functionality.
pub struct ConfigManager {
    /// Whether to report which config files were picked up
    pub verbose: bool,
}

impl ConfigManager {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Load and validate configuration from a specific file.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<FileConfig, DomainAvailError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(DomainAvailError::file_error(
                path.to_string_lossy(),
                "Configuration file not found",
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            DomainAvailError::file_error(
                path.to_string_lossy(),
                format!("Failed to read configuration file: {}", e),
            )
        })?;

        let config: FileConfig = toml::from_str(&content).map_err(|e| {
            DomainAvailError::config(format!("Failed to parse TOML configuration: {}", e))
        })?;

        self.validate_config(&config)?;

        Ok(config)
    }

    /// Discover and load configuration files in precedence order.
    ///
    /// XDG config, then `~/.domain-avail.toml`, then `./domain-avail.toml`;
    /// later files win. Files that fail to load are skipped with a warning.
    pub fn discover_and_load(&self) -> Result<FileConfig, DomainAvailError> {
        let mut merged_config = FileConfig::default();
        let mut loaded_files = Vec::new();

        let candidates = [
            self.get_xdg_config_path(),
            self.get_global_config_path(),
            self.get_local_config_path(),
        ];
        for path in candidates.into_iter().flatten() {
            match self.load_file(&path) {
                Ok(config) => {
                    merged_config = self.merge_configs(merged_config, config);
                    loaded_files.push(path);
                }
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping config file"),
            }
        }

        if self.verbose && loaded_files.len() > 1 {
            for (i, path) in loaded_files.iter().enumerate() {
                let status = if i == loaded_files.len() - 1 {
                    "highest precedence"
                } else {
                    "overridden where set later"
                };
                tracing::info!(path = %path.display(), status, "loaded config file");
            }
        }

        Ok(merged_config)
    }

    fn get_local_config_path(&self) -> Option<PathBuf> {
        let path = Path::new("./domain-avail.toml");
        path.exists().then(|| path.to_path_buf())
    }

    fn get_global_config_path(&self) -> Option<PathBuf> {
        let home = env::var_os("HOME")?;
        let path = Path::new(&home).join(".domain-avail.toml");
        path.exists().then_some(path)
    }

    /// Follows the XDG Base Directory Specification.
    fn get_xdg_config_path(&self) -> Option<PathBuf> {
        let config_dir = env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|home| Path::new(&home).join(".config")))?;

        let path = config_dir.join("domain-avail").join("config.toml");
        path.exists().then_some(path)
    }

    /// Merge two configurations. Values from `higher` take precedence.
    pub fn merge_configs(&self, lower: FileConfig, higher: FileConfig) -> FileConfig {
        FileConfig {
            defaults: match (lower.defaults, higher.defaults) {
                (Some(lower), Some(higher)) => Some(DefaultsConfig {
                    tld: higher.tld.or(lower.tld),
                    input: higher.input.or(lower.input),
                    output_dir: higher.output_dir.or(lower.output_dir),
                    chunk_size: higher.chunk_size.or(lower.chunk_size),
                    retry: higher.retry.or(lower.retry),
                }),
                (lower, higher) => higher.or(lower),
            },
            api: match (lower.api, higher.api) {
                (Some(lower), Some(higher)) => Some(ApiFileConfig {
                    base_url: higher.base_url.or(lower.base_url),
                    preset: higher.preset.or(lower.preset),
                    enable_aftermarket: higher.enable_aftermarket.or(lower.enable_aftermarket),
                    timeout: higher.timeout.or(lower.timeout),
                }),
                (lower, higher) => higher.or(lower),
            },
        }
    }

    /// Validate a configuration for common issues.
    pub fn validate_config(&self, config: &FileConfig) -> Result<(), DomainAvailError> {
        if let Some(defaults) = &config.defaults {
            if let Some(chunk_size) = defaults.chunk_size {
                if chunk_size == 0 || chunk_size > 100 {
                    return Err(DomainAvailError::config(
                        "chunk_size must be between 1 and 100",
                    ));
                }
            }

            if let Some(retry) = defaults.retry {
                if retry > 20 {
                    return Err(DomainAvailError::config("retry must be at most 20"));
                }
            }

            if let Some(tld) = &defaults.tld {
                if tld.trim().is_empty() || tld.contains(' ') {
                    return Err(DomainAvailError::config(format!("Invalid TLD '{}'", tld)));
                }
            }
        }

        if let Some(api) = &config.api {
            if let Some(timeout_str) = &api.timeout {
                if parse_timeout_string(timeout_str).is_none() {
                    return Err(DomainAvailError::config(format!(
                        "Invalid timeout format '{}'. Use format like '5s', '30s', '2m'",
                        timeout_str
                    )));
                }
            }

            if let Some(base_url) = &api.base_url {
                if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
                    return Err(DomainAvailError::config(format!(
                        "base_url '{}' must start with http:// or https://",
                        base_url
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Environment variable configuration that mirrors CLI options.
///
/// This represents configuration values that can be set via DA_* environment variables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvConfig {
    pub tld: Option<String>,
    pub input: Option<String>,
    pub output_dir: Option<String>,
    pub chunk_size: Option<usize>,
    pub retry: Option<u32>,
    pub base_url: Option<String>,
    pub timeout: Option<String>,
}

/// Load configuration from environment variables.
///
/// Invalid values are logged as warnings and ignored.
pub fn load_env_config() -> EnvConfig {
    env_config_from(|key| env::var(key).ok())
}

fn env_config_from<F>(lookup: F) -> EnvConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut env_config = EnvConfig::default();

    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(tld) = non_empty("DA_TLD") {
        tracing::debug!(DA_TLD = %tld, "using environment");
        env_config.tld = Some(tld.trim().to_string());
    }

    if let Some(input) = non_empty("DA_INPUT") {
        tracing::debug!(DA_INPUT = %input, "using environment");
        env_config.input = Some(input);
    }

    if let Some(dir) = non_empty("DA_OUTPUT_DIR") {
        tracing::debug!(DA_OUTPUT_DIR = %dir, "using environment");
        env_config.output_dir = Some(dir);
    }

    if let Some(val) = non_empty("DA_CHUNK_SIZE") {
        match val.trim().parse::<usize>() {
            Ok(size) if (1..=100).contains(&size) => env_config.chunk_size = Some(size),
            _ => tracing::warn!("Invalid DA_CHUNK_SIZE='{}', must be 1-100", val),
        }
    }

    if let Some(val) = non_empty("DA_RETRY") {
        match val.trim().parse::<u32>() {
            Ok(retry) if retry <= 20 => env_config.retry = Some(retry),
            _ => tracing::warn!("Invalid DA_RETRY='{}', must be 0-20", val),
        }
    }

    if let Some(url) = non_empty("DA_BASE_URL") {
        if url.starts_with("http://") || url.starts_with("https://") {
            env_config.base_url = Some(url);
        } else {
            tracing::warn!("Invalid DA_BASE_URL='{}', must start with http(s)://", url);
        }
    }

    if let Some(timeout_str) = non_empty("DA_TIMEOUT") {
        if parse_timeout_string(&timeout_str).is_some() {
            env_config.timeout = Some(timeout_str);
        } else {
            tracing::warn!(
                "Invalid DA_TIMEOUT='{}', use format like '5s', '30s', '2m'",
                timeout_str
            );
        }
    }

    env_config
}

/// Parse a timeout string like "5s", "30s", "2m" into seconds.
///
/// A bare number is taken as seconds. Zero and values that overflow are
/// rejected.
pub fn parse_timeout_string(timeout_str: &str) -> Option<u64> {
    let timeout_str = timeout_str.trim().to_lowercase();

    let secs = if let Some(secs) = timeout_str.strip_suffix('s') {
        secs.parse::<u64>().ok()
    } else if let Some(mins) = timeout_str.strip_suffix('m') {
        mins.parse::<u64>().ok().and_then(|m| m.checked_mul(60))
    } else {
        timeout_str.parse::<u64>().ok()
    }?;

    (secs > 0).then_some(secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();
        temp_file.flush().unwrap();
        temp_file
    }

    #[test]
    fn test_parse_timeout_string() {
        assert_eq!(parse_timeout_string("5s"), Some(5));
        assert_eq!(parse_timeout_string("2m"), Some(120));
        assert_eq!(parse_timeout_string(" 7 "), Some(7));
        assert_eq!(parse_timeout_string("invalid"), None);
    }

    #[test]
    fn test_parse_timeout_rejects_zero_and_overflow() {
        assert_eq!(parse_timeout_string("0s"), None);
        assert_eq!(parse_timeout_string("0"), None);
        assert_eq!(parse_timeout_string("0m"), None);
        assert_eq!(parse_timeout_string("307445734561825861m"), None);
        assert_eq!(
            parse_timeout_string("307445734561825860m"),
            Some(307445734561825860 * 60)
        );

        let env = env_config_from(|key| (key == "DA_TIMEOUT").then(|| "0s".to_string()));
        assert_eq!(env.timeout, None);
    }

    #[test]
    fn test_load_valid_config() {
        let temp_file = write_config(
            r#"
[defaults]
tld = "co.th"
chunk_size = 10
retry = 3

[api]
base_url = "http://localhost:8080"
timeout = "30s"
"#,
        );

        let config = ConfigManager::new(false).load_file(temp_file.path()).unwrap();

        let defaults = config.defaults.unwrap();
        assert_eq!(defaults.tld.as_deref(), Some("co.th"));
        assert_eq!(defaults.chunk_size, Some(10));
        assert_eq!(defaults.retry, Some(3));
        assert_eq!(defaults.input, None);

        let api = config.api.unwrap();
        assert_eq!(api.base_url.as_deref(), Some("http://localhost:8080"));
        assert_eq!(api.timeout.as_deref(), Some("30s"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let manager = ConfigManager::new(false);
        for content in [
            "[defaults]\nchunk_size = 0\n",
            "[defaults]\nretry = 50\n",
            "[api]\ntimeout = \"soon\"\n",
            "[api]\ntimeout = \"0s\"\n",
            "[api]\nbase_url = \"ftp://example\"\n",
            "not toml at all [",
        ] {
            let temp_file = write_config(content);
            let err = manager.load_file(temp_file.path()).unwrap_err();
            assert!(
                matches!(err, DomainAvailError::ConfigError { .. }),
                "{}: {:?}",
                content,
                err
            );
        }
    }

    #[test]
    fn test_missing_file() {
        let err = ConfigManager::new(false)
            .load_file("does/not/exist.toml")
            .unwrap_err();
        assert!(matches!(err, DomainAvailError::FileError { .. }));
    }

    #[test]
    fn test_merge_configs() {
        let manager = ConfigManager::new(false);

        let lower = FileConfig {
            defaults: Some(DefaultsConfig {
                tld: Some("in.th".to_string()),
                chunk_size: Some(5),
                ..Default::default()
            }),
            api: Some(ApiFileConfig {
                timeout: Some("5s".to_string()),
                ..Default::default()
            }),
        };

        let higher = FileConfig {
            defaults: Some(DefaultsConfig {
                chunk_size: Some(20),
                ..Default::default()
            }),
            api: None,
        };

        let merged = manager.merge_configs(lower, higher);
        let defaults = merged.defaults.unwrap();

        assert_eq!(defaults.chunk_size, Some(20)); // Higher wins
        assert_eq!(defaults.tld.as_deref(), Some("in.th")); // Lower preserved
        assert_eq!(merged.api.unwrap().timeout.as_deref(), Some("5s"));
    }

    #[test]
    fn test_env_config_parsing() {
        let vars: HashMap<&str, &str> = [
            ("DA_TLD", " co.th "),
            ("DA_CHUNK_SIZE", "12"),
            ("DA_RETRY", "99"),
            ("DA_BASE_URL", "localhost"),
            ("DA_TIMEOUT", "1m"),
            ("DA_INPUT", ""),
        ]
        .into_iter()
        .collect();

        let config = env_config_from(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(
            config,
            EnvConfig {
                tld: Some("co.th".to_string()),
                chunk_size: Some(12),
                timeout: Some("1m".to_string()),
                ..Default::default()
            }
        );
    }
}
