//! Application configuration management with security considerations.
//!
//! All values come from environment variables. The webhook secret is the only
//! sensitive field: it is validated once at startup, turned into a
//! [`WebhookSecret`] and handed to the request handlers through the app state.
//!
//! # Security Notes
//! - The secret is never logged, only its length
//! - There is no built-in default secret
//! - The TurboDocx docs placeholder is refused in production

use anyhow::{Context, bail};
use envconfig::Envconfig;
use std::fmt;

use crate::consts;

/// Application configuration loaded from the environment.
///
/// `Debug` is intentionally not derived so the secret can't leak through logs.
#[derive(Envconfig, Clone)]
pub struct AppConfig {
    /// Environment name to deploy the app (NON-SENSITIVE)
    /// Values: "local", "dev", "staging", "prod"
    #[envconfig(default = "local")]
    pub env: String,

    /// Host address for web server binding (NON-SENSITIVE)
    #[envconfig(from = "HOST", default = "0.0.0.0")]
    pub web_server_host: String,

    /// Port for web server binding (NON-SENSITIVE)
    #[envconfig(from = "PORT", default = "8080")]
    pub web_server_port: u16,

    /// Path to SSL private key file, only read in prod (SENSITIVE PATH)
    #[envconfig(default = "server.key")]
    pub private_key_path: String,

    /// Path to SSL certificate file, only read in prod (NON-SENSITIVE)
    #[envconfig(default = "server.crt")]
    pub certificate_path: String,

    /// 🔒 SENSITIVE: shared secret used by TurboDocx to sign webhook deliveries
    /// Security: provisioned out-of-band, never logged
    pub webhook_secret: String,

    /// 🔒 SENSITIVE: Logfire write token. Telemetry stays local when absent.
    pub logfire_token: Option<String>,
}

impl AppConfig {
    /// Loads the configuration from the process environment.
    pub fn load() -> anyhow::Result<Self> {
        AppConfig::init_from_env().context(
            "failed to load application configuration, check environment variables",
        )
    }

    /// Checks if running in production environment
    pub fn is_prod(&self) -> bool {
        self.env.to_lowercase() == "prod"
    }

    /// Address the web server binds to
    pub fn server_addr(&self) -> (String, u16) {
        (self.web_server_host.clone(), self.web_server_port)
    }

    /// Validates the configured secret and wraps it into a [`WebhookSecret`].
    ///
    /// An empty secret is always an error. The documentation placeholder is an
    /// error in prod and only a warning elsewhere, so local runs keep working.
    pub fn webhook_secret(&self) -> anyhow::Result<WebhookSecret> {
        let secret = WebhookSecret::try_new(self.webhook_secret.as_str())?;

        if self.webhook_secret == consts::PLACEHOLDER_WEBHOOK_SECRET {
            if self.is_prod() {
                bail!("WEBHOOK_SECRET is still the documentation placeholder");
            }
            logfire::warn!("WEBHOOK_SECRET is the documentation placeholder, do not use it in prod");
        }

        Ok(secret)
    }
}

/// Shared secret used as the HMAC key.
///
/// Immutable once built. `Debug` is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct WebhookSecret(Vec<u8>);

impl WebhookSecret {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self(secret.into())
    }

    /// Builds a secret from a configured value, refusing an empty one.
    pub fn try_new(secret: impl Into<Vec<u8>>) -> anyhow::Result<Self> {
        let secret = Self::new(secret);
        if secret.is_empty() {
            bail!("WEBHOOK_SECRET must be set to a non-empty value");
        }
        Ok(secret)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for WebhookSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WebhookSecret(<{} bytes redacted>)", self.0.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_secret(env: &str, secret: &str) -> AppConfig {
        AppConfig {
            env: env.to_string(),
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
            private_key_path: "server.key".to_string(),
            certificate_path: "server.crt".to_string(),
            webhook_secret: secret.to_string(),
            logfire_token: None,
        }
    }

    #[test]
    fn test_webhook_secret_valid() {
        let secret = config_with_secret("local", "whsec_123").webhook_secret().unwrap();
        assert_eq!(secret.as_bytes(), b"whsec_123");
        assert_eq!(secret.len(), 9);
    }

    #[test]
    fn test_webhook_secret_empty_is_rejected() {
        assert!(config_with_secret("local", "").webhook_secret().is_err());
        assert!(config_with_secret("prod", "").webhook_secret().is_err());
    }

    #[test]
    fn test_webhook_secret_try_new() {
        assert!(WebhookSecret::try_new("").is_err());
        assert!(WebhookSecret::try_new(Vec::new()).is_err());
        assert_eq!(WebhookSecret::try_new("abc").unwrap().as_bytes(), b"abc");
    }

    #[test]
    fn test_webhook_secret_placeholder() {
        let placeholder = consts::PLACEHOLDER_WEBHOOK_SECRET;
        assert!(config_with_secret("local", placeholder).webhook_secret().is_ok());
        assert!(config_with_secret("PROD", placeholder).webhook_secret().is_err());
    }

    #[test]
    fn test_webhook_secret_debug_is_redacted() {
        let secret = WebhookSecret::new("super-secret-value");
        let printed = format!("{:?}", secret);
        assert!(!printed.contains("super-secret-value"));
        assert!(printed.contains("18 bytes"));
    }

    #[test]
    fn test_is_prod() {
        assert!(config_with_secret("prod", "s").is_prod());
        assert!(config_with_secret("Prod", "s").is_prod());
        assert!(!config_with_secret("staging", "s").is_prod());
    }
}
