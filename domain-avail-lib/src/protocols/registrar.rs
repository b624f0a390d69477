//! Registrar availability API client.
//!
//! The registrar answers `GET /api/domains/available` for one TLD and a list
//! of base names at a time:
//!
//! ```text
//! /api/domains/available?preset=pat&enable_aftermarket=0&tld[]=in.th
//!     &domain_name[]=foo&domain_name[]=bar
//! ```

use crate::error::DomainAvailError;
use crate::types::{ApiConfig, ApiResponse};
use reqwest::Url;

const AVAILABILITY_PATH: &str = "/api/domains/available";

/// HTTP client for the registrar availability endpoint.
#[derive(Clone)]
pub struct RegistrarClient {
    /// HTTP client shared by every request of a run
    http_client: reqwest::Client,
    config: ApiConfig,
}

impl RegistrarClient {
    /// Create a client with the default registrar settings.
    pub fn new() -> Result<Self, DomainAvailError> {
        Self::with_config(ApiConfig::default())
    }

    /// Create a client with custom settings.
    pub fn with_config(config: ApiConfig) -> Result<Self, DomainAvailError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("domain-avail/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                DomainAvailError::network(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Build the request URL for a chunk of names under one TLD.
    pub fn availability_url(&self, tld: &str, names: &[String]) -> Result<Url, DomainAvailError> {
        let base = Url::parse(&self.config.base_url).map_err(|e| {
            DomainAvailError::config(format!(
                "Invalid registrar base URL '{}': {}",
                self.config.base_url, e
            ))
        })?;
        let mut url = base.join(AVAILABILITY_PATH).map_err(|e| {
            DomainAvailError::config(format!("Cannot build availability URL: {}", e))
        })?;

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("preset", &self.config.preset)
                .append_pair(
                    "enable_aftermarket",
                    if self.config.enable_aftermarket { "1" } else { "0" },
                )
                .append_pair("tld[]", tld);
            for name in names {
                query.append_pair("domain_name[]", name);
            }
        }

        Ok(url)
    }

    /// Fetch and decode one availability answer.
    ///
    /// # Errors
    ///
    /// Returns `DomainAvailError` if:
    /// - The request cannot be sent or times out
    /// - The server answers with a non-2xx status
    /// - The body is not a valid availability response
    pub async fn get_availability(&self, url: &Url) -> Result<ApiResponse, DomainAvailError> {
        tracing::debug!(%url, "requesting availability");
        let response = self.http_client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainAvailError::network_with_status(
                format!(
                    "Response status is not ok: {} ({})",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("unknown")
                ),
                status.as_u16(),
            ));
        }

        let body = response.text().await?;
        parse_availability_body(&body)
    }
}

/// Decode a response body, keeping the raw text in the error on failure.
pub fn parse_availability_body(body: &str) -> Result<ApiResponse, DomainAvailError> {
    let mut response: ApiResponse = serde_json::from_str(body)
        .map_err(|e| DomainAvailError::parse(format!("{}: {}", e, body), body))?;
    response.raw = body.to_string();
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ApiStatus;

    #[test]
    fn test_availability_url() {
        let client = RegistrarClient::new().unwrap();
        let names = vec!["foo".to_string(), "bar".to_string()];
        let url = client.availability_url("in.th", &names).unwrap();

        assert_eq!(url.host_str(), Some("services.pathosting.co.th"));
        assert_eq!(url.path(), "/api/domains/available");

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("preset".to_string(), "pat".to_string()),
                ("enable_aftermarket".to_string(), "0".to_string()),
                ("tld[]".to_string(), "in.th".to_string()),
                ("domain_name[]".to_string(), "foo".to_string()),
                ("domain_name[]".to_string(), "bar".to_string()),
            ]
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let client = RegistrarClient::with_config(ApiConfig {
            base_url: "not a url".to_string(),
            ..ApiConfig::default()
        })
        .unwrap();
        let err = client.availability_url("in.th", &[]).unwrap_err();
        assert!(matches!(err, DomainAvailError::ConfigError { .. }));
    }

    #[test]
    fn test_parse_availability_body() {
        let ok = parse_availability_body(r#"{"status":"warn","data":{"availability":{}}}"#).unwrap();
        assert_eq!(ok.status, ApiStatus::Warn);
        assert_eq!(ok.raw, r#"{"status":"warn","data":{"availability":{}}}"#);

        let err = parse_availability_body("<html>busy</html>").unwrap_err();
        match err {
            DomainAvailError::ParseError { message, content } => {
                assert!(message.ends_with("<html>busy</html>"));
                assert_eq!(content.as_deref(), Some("<html>busy</html>"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
