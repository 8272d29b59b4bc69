use std::{fs, path::Path, time::Duration};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::retry::RetryPolicy;

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
const API_KEY_ENV_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

fn default_base_url() -> String {
    marketai_provider::gemini::GEMINI_API_BASE.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay_ms() -> u64 {
    1000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssistantConfig {
    #[serde(default)]
    pub provider: ProviderSettings,
    #[serde(default)]
    pub retry: RetrySettings,
}

impl AssistantConfig {
    /// Defaults with the credential taken from the environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.fill_api_key_from_env();
        config
    }

    /// The configured credential, if any. Blank keys count as absent.
    pub fn api_key(&self) -> Option<&str> {
        self.provider
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.provider.timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry.max_attempts,
            Duration::from_millis(self.retry.initial_delay_ms),
        )
    }

    pub fn validate(&self) -> Result<()> {
        if self.provider.model.trim().is_empty() {
            return Err(anyhow!("provider.model must not be empty"));
        }
        if self.provider.base_url.trim().is_empty() {
            return Err(anyhow!("provider.base_url must not be empty"));
        }
        if self.provider.timeout_secs == 0 {
            return Err(anyhow!("provider.timeout_secs must be at least 1"));
        }
        if self.retry.max_attempts == 0 {
            return Err(anyhow!("retry.max_attempts must be at least 1"));
        }
        Ok(())
    }

    fn fill_api_key_from_env(&mut self) {
        if self.api_key().is_none() {
            self.provider.api_key = api_key_from_env();
        }
    }

    fn resolve_env(&mut self) {
        if let Some(key) = self.provider.api_key.as_mut() {
            *key = resolve_env_var(key);
        }
        self.provider.base_url = resolve_env_var(&self.provider.base_url);
        self.provider.model = resolve_env_var(&self.provider.model);
    }
}

fn api_key_from_env() -> Option<String> {
    API_KEY_ENV_VARS
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.trim().is_empty())
}

/// Expand `${VAR}` placeholders from the environment. Unset variables expand
/// to an empty string; an unterminated `${` is kept as written.
pub fn resolve_env_var(raw: &str) -> String {
    let mut output = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some((before, after)) = rest.split_once("${") {
        output.push_str(before);
        match after.split_once('}') {
            Some((name, tail)) => {
                output.push_str(&std::env::var(name).unwrap_or_default());
                rest = tail;
            }
            None => {
                output.push_str("${");
                rest = after;
                break;
            }
        }
    }

    output.push_str(rest);
    output
}

pub fn load_config(path: &Path) -> Result<AssistantConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let mut config: AssistantConfig = serde_yaml::from_str(&content)
        .with_context(|| format!("failed to parse config {}", path.display()))?;

    config.resolve_env();
    config.fill_api_key_from_env();
    config
        .validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_config(yaml: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_match_reference_behavior() {
        let config = AssistantConfig::default();
        assert_eq!(config.provider.model, "gemini-3-flash-preview");
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.initial_delay_ms, 1000);
        assert_eq!(config.retry_policy(), RetryPolicy::default());
        assert_eq!(config.timeout(), Duration::from_secs(120));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_config_reads_yaml_sections() {
        let file = write_config(
            "provider:\n  api_key: literal-key\n  model: gemini-pro\n  base_url: http://localhost:9999\nretry:\n  max_attempts: 5\n  initial_delay_ms: 10\n",
        );
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.api_key(), Some("literal-key"));
        assert_eq!(config.provider.model, "gemini-pro");
        assert_eq!(config.provider.base_url, "http://localhost:9999");
        assert_eq!(config.retry_policy().max_attempts(), 5);
        assert_eq!(config.retry_policy().initial_delay(), Duration::from_millis(10));
    }

    #[test]
    fn load_config_expands_env_placeholders() {
        let expected = std::env::var("PATH").unwrap();
        let file = write_config("provider:\n  api_key: \"${PATH}\"\n");
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.provider.api_key.as_deref(), Some(expected.as_str()));
    }

    #[test]
    fn load_config_rejects_zero_attempts() {
        let file = write_config("retry:\n  max_attempts: 0\n");
        let err = load_config(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("max_attempts"));
    }

    #[test]
    fn load_config_missing_file_fails_with_path() {
        let err = load_config(Path::new("/nonexistent/marketai.yaml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/marketai.yaml"));
    }

    #[test]
    fn blank_api_key_counts_as_absent() {
        let mut config = AssistantConfig::default();
        config.provider.api_key = Some("   ".into());
        assert_eq!(config.api_key(), None);
    }

    #[test]
    fn literal_settings_pass_through_expansion() {
        assert_eq!(
            resolve_env_var("https://generativelanguage.googleapis.com/v1beta"),
            "https://generativelanguage.googleapis.com/v1beta"
        );
    }

    #[test]
    fn unset_placeholder_in_base_url_expands_to_empty() {
        assert_eq!(
            resolve_env_var("http://${MARKETAI_TEST_UNSET_GEMINI_HOST}/v1beta"),
            "http:///v1beta"
        );
    }

    #[test]
    fn unterminated_placeholder_is_kept_verbatim() {
        assert_eq!(resolve_env_var("gemini-${MODEL_SUFFIX"), "gemini-${MODEL_SUFFIX");
    }

    #[test]
    fn unset_key_placeholder_falls_back_to_demo_mode() {
        let file = write_config("provider:\n  api_key: \"${MARKETAI_TEST_UNSET_KEY}\"\n");
        let config = load_config(file.path()).unwrap();
        // Only a real GEMINI_API_KEY/API_KEY in the test environment fills it.
        if std::env::var("GEMINI_API_KEY").is_err() && std::env::var("API_KEY").is_err() {
            assert_eq!(config.api_key(), None);
        }
    }
}
