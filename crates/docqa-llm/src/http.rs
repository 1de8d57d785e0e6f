//! HTTP plumbing shared by the provider clients

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::Client;

use docqa_core::{Error, Result};

use crate::config::LlmConfig;

/// Join a base URL and a path without doubling or dropping slashes
pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Build an HTTP client that sends a bearer token on every request
pub(crate) fn bearer_client(api_key: &str, config: &LlmConfig) -> Result<Client> {
    let mut headers = HeaderMap::new();
    let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key))
        .map_err(|e| Error::Configuration(format!("Invalid API key: {}", e)))?;
    auth.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth);

    Client::builder()
        .timeout(config.timeout())
        .default_headers(headers)
        .build()
        .map_err(|e| Error::Network(e.to_string()))
}

/// Turn a non-success response into a provider error carrying the body
pub(crate) async fn check_status(response: reqwest::Response, vendor: &str) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(Error::LLMProvider(format!(
        "{} API request failed with status {}: {}",
        vendor, status, error_text
    )))
}

/// HTTP client with the configured timeout and no default headers
pub(crate) fn plain_client(config: &LlmConfig) -> Result<Client> {
    Client::builder()
        .timeout(config.timeout())
        .build()
        .map_err(|e| Error::Network(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_join() {
        assert_eq!(
            endpoint("https://api.openai.com/v1/", "/chat/completions"),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(endpoint("http://127.0.0.1:11434", "api/generate"), "http://127.0.0.1:11434/api/generate");
    }

    #[test]
    fn test_clients_build_without_network() {
        let config = LlmConfig::default();
        assert!(bearer_client("sk-test", &config).is_ok());
        assert!(plain_client(&config).is_ok());
    }

    #[test]
    fn test_rejects_unprintable_key() {
        let err = bearer_client("bad\nkey", &LlmConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}
