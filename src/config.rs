//! Client configuration: defaults, YAML files and environment overrides.
//!
//! Precedence is `default < file < environment < builder overrides`. API keys
//! are never read from the file itself; the file names the environment
//! variable that holds the key.

use std::env;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, ErrorContext, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    pub base_url: String,
    pub model: String,
    /// Name of the environment variable holding the bearer key.
    pub api_key_env: String,
    #[serde(skip)]
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub proxy_url: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    /// Upper bound on model calls per round trip.
    pub max_iterations: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            api_key: None,
            timeout_secs: 30,
            proxy_url: None,
            temperature: None,
            max_tokens: None,
            max_iterations: 5,
        }
    }
}

impl ClientConfig {
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| {
            Error::configuration_with_context(
                "invalid configuration file",
                ErrorContext::new()
                    .with_details(e.to_string())
                    .with_source("config_loader"),
            )
        })
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content).map_err(|e| match e {
            Error::Configuration { message, context } => Error::Configuration {
                message,
                context: context.with_field_path(path.display().to_string()),
            },
            other => other,
        })
    }

    /// Defaults plus environment overrides, with the API key resolved.
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides()
    }

    /// Apply `AI_*` environment overrides and resolve the API key.
    ///
    /// - `AI_BASE_URL`, `AI_MODEL`, `AI_PROXY_URL`
    /// - `AI_HTTP_TIMEOUT_SECS` (falls back to `AI_TIMEOUT_SECS`)
    /// - `AI_MAX_TOOL_ITERATIONS`
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(v) = env::var("AI_BASE_URL") {
            self.base_url = v;
        }
        if let Ok(v) = env::var("AI_MODEL") {
            self.model = v;
        }
        if let Ok(v) = env::var("AI_PROXY_URL") {
            self.proxy_url = Some(v);
        }
        let timeout = match env_parse::<u64>("AI_HTTP_TIMEOUT_SECS")? {
            Some(secs) => Some(secs),
            None => env_parse::<u64>("AI_TIMEOUT_SECS")?,
        };
        if let Some(secs) = timeout {
            self.timeout_secs = secs;
        }
        if let Some(n) = env_parse::<usize>("AI_MAX_TOOL_ITERATIONS")? {
            self.max_iterations = n;
        }
        if self.api_key.is_none() {
            self.api_key = env::var(&self.api_key_env).ok().filter(|k| !k.is_empty());
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        let parsed = url::Url::parse(&self.base_url).map_err(|e| {
            Error::configuration_with_context(
                "base_url is not a valid URL",
                ErrorContext::new()
                    .with_field_path("base_url")
                    .with_details(e.to_string())
                    .with_source("config_loader"),
            )
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::configuration_with_context(
                "base_url must use http or https",
                ErrorContext::new()
                    .with_field_path("base_url")
                    .with_details(format!("scheme '{}'", parsed.scheme()))
                    .with_source("config_loader"),
            ));
        }
        if self.model.trim().is_empty() {
            return Err(Error::configuration_with_context(
                "model must not be empty",
                ErrorContext::new().with_field_path("model"),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(Error::configuration_with_context(
                "timeout_secs must be positive",
                ErrorContext::new().with_field_path("timeout_secs"),
            ));
        }
        if self.max_iterations == 0 {
            return Err(Error::configuration_with_context(
                "max_iterations must be at least 1",
                ErrorContext::new().with_field_path("max_iterations"),
            ));
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            Error::configuration_with_context(
                format!("{} has an invalid value", key),
                ErrorContext::new()
                    .with_field_path(key)
                    .with_details(raw.clone())
                    .with_source("environment"),
            )
        }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Tests touching the process environment run one at a time.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const ENV_KEYS: &[&str] = &[
        "AI_BASE_URL",
        "AI_MODEL",
        "AI_PROXY_URL",
        "AI_HTTP_TIMEOUT_SECS",
        "AI_TIMEOUT_SECS",
        "AI_MAX_TOOL_ITERATIONS",
        "AI_TOOLCALL_TEST_KEY",
    ];

    fn clear_env() {
        for key in ENV_KEYS {
            env::remove_var(key);
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        let cfg = ClientConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.max_iterations, 5);
        assert_eq!(cfg.api_key_env, "OPENAI_API_KEY");
    }

    #[test]
    fn test_yaml_partial_override() {
        let cfg = ClientConfig::from_yaml_str(
            r#"
model: gpt-4o
base_url: http://localhost:8080/v1
api_key_env: LOCAL_LLM_KEY
temperature: 0.2
max_iterations: 3
"#,
        )
        .unwrap();
        assert_eq!(cfg.model, "gpt-4o");
        assert_eq!(cfg.base_url, "http://localhost:8080/v1");
        assert_eq!(cfg.api_key_env, "LOCAL_LLM_KEY");
        assert_eq!(cfg.temperature, Some(0.2));
        assert_eq!(cfg.max_iterations, 3);
        assert_eq!(cfg.timeout_secs, 30);
        assert!(cfg.api_key.is_none());
    }

    #[test]
    fn test_yaml_rejects_inline_api_key() {
        let err = ClientConfig::from_yaml_str("api_key: sk-secret\n").unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad_url = ClientConfig {
            base_url: "not a url".into(),
            ..ClientConfig::default()
        };
        assert!(bad_url.validate().is_err());

        let bad_scheme = ClientConfig {
            base_url: "ftp://example.com".into(),
            ..ClientConfig::default()
        };
        assert!(bad_scheme.validate().is_err());

        let zero_iter = ClientConfig {
            max_iterations: 0,
            ..ClientConfig::default()
        };
        assert_eq!(
            zero_iter.validate().unwrap_err().context().unwrap().field_path.as_deref(),
            Some("max_iterations")
        );
    }

    #[test]
    fn test_env_overrides_applied() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        env::set_var("AI_BASE_URL", "http://localhost:11434/v1");
        env::set_var("AI_MODEL", "llama3.1");
        env::set_var("AI_MAX_TOOL_ITERATIONS", "7");
        env::set_var("AI_HTTP_TIMEOUT_SECS", "12");
        env::set_var("AI_TOOLCALL_TEST_KEY", "sk-from-env");

        let cfg = ClientConfig {
            api_key_env: "AI_TOOLCALL_TEST_KEY".into(),
            ..ClientConfig::default()
        }
        .with_env_overrides();
        clear_env();

        let cfg = cfg.unwrap();
        assert_eq!(cfg.base_url, "http://localhost:11434/v1");
        assert_eq!(cfg.model, "llama3.1");
        assert_eq!(cfg.max_iterations, 7);
        assert_eq!(cfg.timeout_secs, 12);
        assert_eq!(cfg.api_key.as_deref(), Some("sk-from-env"));
    }

    #[test]
    fn test_env_invalid_iterations_rejected() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        env::set_var("AI_MAX_TOOL_ITERATIONS", "many");

        let result = ClientConfig::from_env();
        clear_env();

        let err = result.unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
        let ctx = err.context().unwrap();
        assert_eq!(ctx.field_path.as_deref(), Some("AI_MAX_TOOL_ITERATIONS"));
        assert_eq!(ctx.details.as_deref(), Some("many"));
    }

    #[test]
    fn test_env_timeout_fallback_only_when_primary_absent() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        env::set_var("AI_HTTP_TIMEOUT_SECS", "15");
        env::set_var("AI_TIMEOUT_SECS", "not-a-number");
        let primary = ClientConfig::from_env();

        env::remove_var("AI_HTTP_TIMEOUT_SECS");
        env::set_var("AI_TIMEOUT_SECS", "9");
        let fallback = ClientConfig::from_env();
        clear_env();

        assert_eq!(primary.unwrap().timeout_secs, 15);
        assert_eq!(fallback.unwrap().timeout_secs, 9);
    }

    #[test]
    fn test_example_file_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/toolcall.example.yaml");
        let cfg = ClientConfig::from_yaml_file(&path).unwrap();
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.model, DEFAULT_MODEL);
        assert_eq!(cfg.api_key_env, DEFAULT_API_KEY_ENV);
        assert_eq!(cfg.temperature, Some(0.2));
        assert_eq!(cfg.max_tokens, Some(512));
        assert_eq!(cfg.max_iterations, 5);
        assert!(cfg.proxy_url.is_none());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_yaml_file_errors() {
        assert!(matches!(
            ClientConfig::from_yaml_file("config/does-not-exist.yaml"),
            Err(Error::Io(_))
        ));

        let path = std::env::temp_dir().join("ai-toolcall-bad-config.yaml");
        std::fs::write(&path, "max_iterations: lots\n").unwrap();
        let err = ClientConfig::from_yaml_file(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        let expected = path.display().to_string();
        assert_eq!(
            err.context().unwrap().field_path.as_deref(),
            Some(expected.as_str())
        );
    }
}
