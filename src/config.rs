use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::core::ScorerKind;
use crate::models::ScoringWeights;
use crate::services::RetryPolicy;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub geocoder: GeocoderSettings,
    #[serde(default)]
    pub mail: MailSettings,
    #[serde(default)]
    pub location: LocationSettings,
    #[serde(default)]
    pub registry: RegistrySettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
    /// Base URL used when building share, dashboard and QR links
    #[serde(default = "default_public_url")]
    pub public_url: String,
}

fn default_public_url() -> String { "http://localhost:8080".to_string() }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchingSettings {
    #[serde(default)]
    pub scorer: ScorerKind,
    #[serde(default)]
    pub weights: WeightsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_details_weight")]
    pub details: f64,
    #[serde(default = "default_answers_weight")]
    pub answers: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            details: default_details_weight(),
            answers: default_answers_weight(),
        }
    }
}

impl WeightsConfig {
    /// Both weights must be finite and non-negative, and at least one positive
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, weight) in [("details", self.details), ("answers", self.answers)] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ConfigError::Message(format!(
                    "matching.weights.{} must be a finite, non-negative number, got {}",
                    name, weight
                )));
            }
        }
        if self.details + self.answers <= 0.0 {
            return Err(ConfigError::Message(
                "matching.weights must not all be zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl From<&WeightsConfig> for ScoringWeights {
    fn from(config: &WeightsConfig) -> Self {
        Self {
            details: config.details,
            answers: config.answers,
        }
    }
}

fn default_details_weight() -> f64 { 0.4 }
fn default_answers_weight() -> f64 { 0.6 }

#[derive(Debug, Clone, Deserialize)]
pub struct GeocoderSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_geocoder_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    pub max_attempts: Option<u32>,
    pub retry_delay_ms: Option<u64>,
    pub timeout_secs: Option<u64>,
    pub cache_ttl_secs: Option<u64>,
    pub cache_capacity: Option<u64>,
}

impl Default for GeocoderSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_geocoder_endpoint(),
            user_agent: default_user_agent(),
            max_attempts: None,
            retry_delay_ms: None,
            timeout_secs: None,
            cache_ttl_secs: None,
            cache_capacity: None,
        }
    }
}

impl GeocoderSettings {
    pub fn retry_policy(&self) -> RetryPolicy {
        let defaults = RetryPolicy::default();
        RetryPolicy {
            max_attempts: self.max_attempts.unwrap_or(defaults.max_attempts),
            delay: self
                .retry_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.delay),
        }
    }
}

fn default_geocoder_endpoint() -> String { "https://nominatim.openstreetmap.org".to_string() }
fn default_user_agent() -> String { "event-match".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct MailSettings {
    /// Mail relay endpoint; notifications are only logged when unset
    pub relay_url: Option<String>,
    pub api_key: Option<String>,
    #[serde(default = "default_sender")]
    pub sender: String,
}

impl Default for MailSettings {
    fn default() -> Self {
        Self {
            relay_url: None,
            api_key: None,
            sender: default_sender(),
        }
    }
}

fn default_sender() -> String { "noreply@eventmatch.local".to_string() }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationSettings {
    /// Refuse registrations whose reported coordinates fall outside the event radius
    #[serde(default)]
    pub enforce_radius: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrySettings {
    pub max_code_attempts: Option<u32>,
}

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with EVENTMATCH__)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080_i64)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., EVENTMATCH__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("EVENTMATCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = substitute_env_vars(settings)?;

        let settings: Self = settings.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("EVENTMATCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Self = settings.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.matching.weights.validate()
    }
}

/// Apply the conventional unprefixed variables for secrets and the public URL
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(api_key) = env::var("MAIL_API_KEY") {
        builder = builder.set_override("mail.api_key", api_key)?;
    }
    if let Ok(relay_url) = env::var("MAIL_RELAY_URL") {
        builder = builder.set_override("mail.relay_url", relay_url)?;
    }
    if let Ok(sender) = env::var("MAIL_DEFAULT_SENDER") {
        builder = builder.set_override("mail.sender", sender)?;
    }
    if let Ok(public_url) = env::var("PUBLIC_URL") {
        builder = builder.set_override("server.public_url", public_url)?;
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights() {
        let weights = WeightsConfig::default();
        assert_eq!(weights.details, 0.4);
        assert_eq!(weights.answers, 0.6);
    }

    #[test]
    fn test_retry_policy_defaults() {
        let policy = GeocoderSettings::default().retry_policy();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.delay, Duration::from_secs(1));
    }

    #[test]
    fn test_retry_policy_overrides() {
        let settings = GeocoderSettings {
            max_attempts: Some(2),
            retry_delay_ms: Some(250),
            ..GeocoderSettings::default()
        };
        let policy = settings.retry_policy();
        assert_eq!(policy.max_attempts, 2);
        assert_eq!(policy.delay, Duration::from_millis(250));
    }

    #[test]
    fn test_weight_validation() {
        assert!(WeightsConfig::default().validate().is_ok());
        assert!(WeightsConfig { details: 1.0, answers: 0.0 }.validate().is_ok());

        for (details, answers) in [(2.0, -1.0), (f64::NAN, 1.0), (f64::INFINITY, 1.0), (0.0, 0.0)] {
            let weights = WeightsConfig { details, answers };
            assert!(weights.validate().is_err(), "accepted {:?}", weights);
        }
    }

    #[test]
    fn test_load_rejects_negative_weights() {
        let path = std::env::temp_dir().join(format!("event-match-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            r#"
[server]
host = "127.0.0.1"
port = 8080

[matching.weights]
details = 2.0
answers = -1.0
"#,
        )
        .unwrap();

        let result = Settings::load_from(&path);
        std::fs::remove_file(&path).ok();

        let err = result.unwrap_err();
        assert!(err.to_string().contains("matching.weights.answers"), "{}", err);
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("event-match-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            r#"
[server]
host = "0.0.0.0"
port = 9000
public_url = "https://em.example"

[matching]
scorer = "random"

[location]
enforce_radius = true
"#,
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.server.public_url, "https://em.example");
        assert_eq!(settings.matching.scorer, ScorerKind::Random);
        assert!(settings.location.enforce_radius);
        assert!(!settings.geocoder.enabled);
        assert_eq!(settings.mail.sender, "noreply@eventmatch.local");
    }
}
