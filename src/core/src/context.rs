//! The explicitly constructed client root.

use tracing::info;

use crate::client::ApiClient;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::resources::Api;
use crate::session::AuthManager;
use crate::telemetry::describe_metrics;

/// Resource facade plus authentication state over one shared [`ApiClient`].
///
/// Built once by the application and passed by reference to whatever needs
/// backend access. Both halves share the connection pool and cookie jar, so a
/// login through `auth` authenticates every later `api` call.
#[derive(Debug, Clone)]
pub struct ApqpClient {
    pub api: Api,
    pub auth: AuthManager,
}

impl ApqpClient {
    pub fn new(client: ApiClient, config: &ClientConfig) -> Self {
        Self {
            api: Api::new(client.clone()),
            auth: AuthManager::new(client, config.auth.clone()),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        describe_metrics();
        let client = ApiClient::from_config(&config.api, &config.auth)?;
        info!(base_url = client.base_url(), "API client ready");
        Ok(Self::new(client, config))
    }

    /// The shared request core.
    pub fn client(&self) -> &ApiClient {
        self.api.client()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;

    #[test]
    fn test_halves_share_cookie_jar() {
        let config = ClientConfig {
            api: ApiConfig {
                base_url: "http://localhost:8000".to_string(),
                ..ApiConfig::default()
            },
            ..ClientConfig::default()
        };
        let client = ApqpClient::from_config(&config).unwrap();
        client.client().add_cookie("csrftoken=abc123; Path=/");
        assert_eq!(client.api.client().csrf_token(), Some("abc123".to_string()));
        assert!(!client.auth.is_authenticated());
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let config = ClientConfig {
            api: ApiConfig {
                base_url: "not a url".to_string(),
                ..ApiConfig::default()
            },
            ..ClientConfig::default()
        };
        assert!(ApqpClient::from_config(&config).is_err());
    }
}
