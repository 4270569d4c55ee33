/// Runtime configuration for the registry.
///
/// Resolution order, later wins:
///   1. built-in defaults (every field has one)
///   2. an optional TOML file
///   3. `FLOODGUARD_*` environment variables (a `.env` file is loaded first)
///
/// Example `floodguard.toml`:
/// ```toml
/// [session]
/// dir = "/var/lib/floodguard"
///
/// [dispatch]
/// success_rate = 0.95
/// seed = 42
///
/// [logging]
/// level = "debug"
/// file = "floodguard.log"
/// ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::alert::dispatch::DEFAULT_SUCCESS_RATE;
use crate::language::MessageLanguage;
use crate::logging::{self, Component, LogLevel};
use crate::model::RegistryError;
use crate::session::DEFAULT_SESSION_KEY;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub session: SessionConfig,
    pub dispatch: DispatchConfig,
    pub logging: LoggingConfig,
    pub messaging: MessagingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Directory holding the `<key>.json` session file.
    pub dir: PathBuf,
    pub key: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            key: DEFAULT_SESSION_KEY.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Probability in [0, 1] that a sent message is confirmed delivered.
    pub success_rate: f64,
    /// Simulated provider hand-off latency.
    pub send_latency_ms: u64,
    /// Simulated wait before the carrier confirms delivery.
    pub confirm_latency_ms: u64,
    /// Fixes the outcome sequence when set.
    pub seed: Option<u64>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            success_rate: DEFAULT_SUCCESS_RATE,
            send_latency_ms: 500,
            confirm_latency_ms: 1500,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub file: Option<String>,
    pub console_timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            file: None,
            console_timestamps: true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MessagingConfig {
    pub default_language: MessageLanguage,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl RegistryConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, RegistryError> {
        let config: RegistryConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let contents = fs::read_to_string(path).map_err(|source| RegistryError::ConfigRead {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Full resolution: defaults, then `path` if given, then the process
    /// environment (after loading `.env` if present).
    pub fn load_with_env(path: Option<&Path>) -> Result<Self, RegistryError> {
        dotenv::dotenv().ok();
        let mut config = match path {
            Some(p) => Self::load(p)?,
            None => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        logging::debug(
            Component::Config,
            None,
            &format!(
                "config resolved: success_rate={}, seed={:?}, session={}",
                config.dispatch.success_rate,
                config.dispatch.seed,
                config.session_path().display()
            ),
        );
        Ok(config)
    }

    /// Applies `FLOODGUARD_*` overrides read through `lookup`. Taking a
    /// lookup function keeps tests off the process environment.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), RegistryError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("FLOODGUARD_SESSION_DIR") {
            self.session.dir = PathBuf::from(dir);
        }
        if let Some(key) = lookup("FLOODGUARD_SESSION_KEY") {
            self.session.key = key;
        }
        if let Some(raw) = lookup("FLOODGUARD_SUCCESS_RATE") {
            self.dispatch.success_rate = parse_env("FLOODGUARD_SUCCESS_RATE", &raw)?;
        }
        if let Some(raw) = lookup("FLOODGUARD_DISPATCH_SEED") {
            self.dispatch.seed = Some(parse_env("FLOODGUARD_DISPATCH_SEED", &raw)?);
        }
        if let Some(raw) = lookup("FLOODGUARD_LOG_LEVEL") {
            self.logging.level = parse_env("FLOODGUARD_LOG_LEVEL", &raw)?;
        }
        if let Some(file) = lookup("FLOODGUARD_LOG_FILE") {
            self.logging.file = Some(file);
        }
        if let Some(raw) = lookup("FLOODGUARD_DEFAULT_LANGUAGE") {
            self.messaging.default_language = parse_env("FLOODGUARD_DEFAULT_LANGUAGE", &raw)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), RegistryError> {
        let rate = self.dispatch.success_rate;
        if !(0.0..=1.0).contains(&rate) {
            return Err(RegistryError::ConfigValue {
                key: "dispatch.success_rate".to_string(),
                reason: format!("{} is outside [0, 1]", rate),
            });
        }
        if self.session.key.trim().is_empty() {
            return Err(RegistryError::ConfigValue {
                key: "session.key".to_string(),
                reason: "must not be blank".to_string(),
            });
        }
        Ok(())
    }

    /// Location of the persisted session file.
    pub fn session_path(&self) -> PathBuf {
        self.session.dir.join(format!("{}.json", self.session.key))
    }
}

fn parse_env<T>(key: &str, raw: &str) -> Result<T, RegistryError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| RegistryError::ConfigValue {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = RegistryConfig::default();
        assert_eq!(config.dispatch.success_rate, 0.98);
        assert_eq!(config.dispatch.send_latency_ms, 500);
        assert_eq!(config.session.key, "floodguard_user");
        assert_eq!(config.logging.level, LogLevel::Info);
        assert_eq!(config.messaging.default_language, MessageLanguage::English);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config = RegistryConfig::from_toml_str(
            r#"
            [dispatch]
            success_rate = 0.5
            seed = 7

            [logging]
            level = "warning"

            [messaging]
            default_language = "ha"
            "#,
        )
        .unwrap();

        assert_eq!(config.dispatch.success_rate, 0.5);
        assert_eq!(config.dispatch.seed, Some(7));
        assert_eq!(config.dispatch.confirm_latency_ms, 1500);
        assert_eq!(config.logging.level, LogLevel::Warning);
        assert_eq!(config.messaging.default_language, MessageLanguage::Hausa);
        assert_eq!(config.session.key, "floodguard_user");
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = RegistryConfig::from_toml_str("").unwrap();
        assert_eq!(config.dispatch.success_rate, DEFAULT_SUCCESS_RATE);
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = RegistryConfig::from_toml_str("[dispatch\nsuccess_rate = ").unwrap_err();
        assert!(matches!(err, RegistryError::ConfigParse(_)));
    }

    #[test]
    fn test_out_of_range_success_rate_rejected() {
        let err = RegistryConfig::from_toml_str("[dispatch]\nsuccess_rate = 1.5").unwrap_err();
        assert!(matches!(err, RegistryError::ConfigValue { ref key, .. } if key == "dispatch.success_rate"));
    }

    #[test]
    fn test_env_overrides_win() {
        let mut config = RegistryConfig::default();
        config
            .apply_env_overrides(env(&[
                ("FLOODGUARD_SESSION_DIR", "/tmp/fg"),
                ("FLOODGUARD_SUCCESS_RATE", "0.25"),
                ("FLOODGUARD_DISPATCH_SEED", "99"),
                ("FLOODGUARD_LOG_LEVEL", "debug"),
                ("FLOODGUARD_DEFAULT_LANGUAGE", "yo"),
            ]))
            .unwrap();

        assert_eq!(config.session.dir, PathBuf::from("/tmp/fg"));
        assert_eq!(config.dispatch.success_rate, 0.25);
        assert_eq!(config.dispatch.seed, Some(99));
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.messaging.default_language, MessageLanguage::Yoruba);
        assert_eq!(config.session_path(), PathBuf::from("/tmp/fg/floodguard_user.json"));
    }

    #[test]
    fn test_unparseable_env_override_names_the_variable() {
        let mut config = RegistryConfig::default();
        let err = config
            .apply_env_overrides(env(&[("FLOODGUARD_DISPATCH_SEED", "soon")]))
            .unwrap_err();
        assert!(matches!(err, RegistryError::ConfigValue { ref key, .. } if key == "FLOODGUARD_DISPATCH_SEED"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[session]\nkey = \"ops_user\"").unwrap();

        let config = RegistryConfig::load(file.path()).unwrap();
        assert_eq!(config.session.key, "ops_user");
    }

    #[test]
    fn test_load_missing_file_is_read_error() {
        let err = RegistryConfig::load(Path::new("/nonexistent/floodguard.toml")).unwrap_err();
        assert!(matches!(err, RegistryError::ConfigRead { .. }));
    }
}
