// # DigitalOcean DNS Provider
//
// This crate provides the DigitalOcean implementation of the doddns
// `DnsProvider` trait.
//
// ## Behavior
//
// - One HTTP request per trait call; no retries, no caching
// - `get_domain` maps 404 to `Ok(None)` so the resolver can keep walking
// - Specific error mapping for HTTP status codes (401/403, 404, 429, 5xx)
// - A and AAAA records only
//
// ## Security Requirements
//
// - API token NEVER appears in logs or `Debug` output
// - Provider MUST fail fast if token is empty
//
// ## API Reference
//
// - DigitalOcean API v2: https://docs.digitalocean.com/reference/api/
// - Get domain: GET `/domains/:name`
// - List records: GET `/domains/:name/records?type=A&name=home.example.com`
// - Create record: POST `/domains/:name/records`
// - Update record: PUT `/domains/:name/records/:id`

use async_trait::async_trait;
use doddns_core::config::ProviderConfig;
use doddns_core::traits::{DnsProvider, DnsRecord, Domain, RecordRequest, RecordType};
use doddns_core::{Error, Result};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::time::Duration;

/// DigitalOcean API base URL
pub const DIGITALOCEAN_API_BASE: &str = "https://api.digitalocean.com/v2";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Name DigitalOcean uses for records at the zone apex
const APEX_NAME: &str = "@";

/// Largest page DigitalOcean serves for record listings
const RECORDS_PER_PAGE: &str = "200";

#[derive(Debug, Deserialize)]
struct DomainResponse {
    domain: DoDomain,
}

#[derive(Debug, Deserialize)]
struct DoDomain {
    name: String,
}

#[derive(Debug, Deserialize)]
struct DomainRecordsResponse {
    domain_records: Vec<DoDomainRecord>,
}

#[derive(Debug, Deserialize)]
struct DomainRecordResponse {
    domain_record: DoDomainRecord,
}

#[derive(Debug, Clone, Deserialize)]
struct DoDomainRecord {
    id: i64,
    #[serde(rename = "type")]
    record_type: String,
    name: String,
    data: String,
    ttl: u32,
}

/// Body for both create (POST) and edit (PUT)
#[derive(Debug, Serialize)]
struct RecordEditRequest<'a> {
    #[serde(rename = "type")]
    record_type: &'static str,
    name: &'a str,
    data: String,
    ttl: u32,
}

impl<'a> From<&'a RecordRequest> for RecordEditRequest<'a> {
    fn from(request: &'a RecordRequest) -> Self {
        Self {
            record_type: request.record_type.as_str(),
            name: if request.name.is_empty() {
                APEX_NAME
            } else {
                &request.name
            },
            data: request.ip.to_string(),
            ttl: request.ttl,
        }
    }
}

#[derive(Debug, Deserialize)]
struct DoErrorResponse {
    id: String,
    message: String,
}

/// DigitalOcean DNS provider
pub struct DigitalOceanProvider {
    /// DigitalOcean personal access token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// API base URL (without trailing slash)
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for DigitalOceanProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DigitalOceanProvider")
            .field("api_token", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl DigitalOceanProvider {
    /// Create a provider for the public DigitalOcean API
    ///
    /// # Errors
    ///
    /// `Error::Config` if the token is empty.
    pub fn new(api_token: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_token, DIGITALOCEAN_API_BASE)
    }

    /// Create a provider against a custom API endpoint
    ///
    /// Used to point the provider at a proxy or a mock server.
    pub fn with_base_url(api_token: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let api_token = api_token.into().trim().to_string();
        if api_token.is_empty() {
            return Err(Error::config("DigitalOcean API token cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_token,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Create a provider from configuration
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        match config {
            ProviderConfig::DigitalOcean { api_token, api_base } => Self::with_base_url(
                api_token.clone(),
                api_base.as_deref().unwrap_or(DIGITALOCEAN_API_BASE),
            ),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and decode a successful JSON body
    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        context: &str,
    ) -> Result<T> {
        let response = request
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| Error::http(format!("{}: request failed: {}", context, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(status_error(status, &body, context));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::http(format!("{}: failed to read response: {}", context, e)))?;

        Ok(serde_json::from_slice(&body)?)
    }
}

/// Map a non-success response to an error
fn status_error(status: StatusCode, body: &str, context: &str) -> Error {
    let detail = match serde_json::from_str::<DoErrorResponse>(body) {
        Ok(err) => format!("{} ({})", err.message, err.id),
        Err(_) => body.to_string(),
    };

    match status.as_u16() {
        401 | 403 => Error::auth(format!(
            "{}: invalid API token or insufficient permissions. Status: {}",
            context, status
        )),
        404 => Error::not_found(format!("{}: {}", context, detail)),
        429 => Error::rate_limited(format!("{}: rate limit exceeded. Status: {}", context, status)),
        500..=599 => Error::provider(
            "digitalocean",
            format!("{}: server error {} - {}", context, status, detail),
        ),
        _ => Error::provider(
            "digitalocean",
            format!("{}: {} - {}", context, status, detail),
        ),
    }
}

/// Convert an API record into the core record type
fn convert_record(record: DoDomainRecord) -> Result<DnsRecord> {
    let record_type = match record.record_type.to_uppercase().as_str() {
        "A" => RecordType::A,
        "AAAA" => RecordType::Aaaa,
        other => {
            return Err(Error::provider(
                "digitalocean",
                format!("Unexpected record type {} for record {}", other, record.id),
            ));
        }
    };

    let ip: IpAddr = record.data.parse().map_err(|_| {
        Error::provider(
            "digitalocean",
            format!("Record {} holds an invalid IP address: {}", record.id, record.data),
        )
    })?;

    if RecordType::for_ip(&ip) != record_type {
        return Err(Error::provider(
            "digitalocean",
            format!("Record {} is {} but holds {}", record.id, record_type, ip),
        ));
    }

    let name = if record.name == APEX_NAME {
        String::new()
    } else {
        record.name
    };

    Ok(DnsRecord {
        id: record.id.to_string(),
        record_type,
        name,
        ip,
        ttl: record.ttl,
    })
}

#[async_trait]
impl DnsProvider for DigitalOceanProvider {
    async fn get_domain(&self, name: &str) -> Result<Option<Domain>> {
        tracing::debug!("Looking up DigitalOcean domain: {}", name);

        let request = self.client.get(self.url(&format!("/domains/{}", name)));
        match self.send::<DomainResponse>(request, "get domain").await {
            Ok(response) => Ok(Some(Domain {
                name: response.domain.name,
            })),
            Err(e) if e.is_not_found() => {
                tracing::debug!("Domain {} does not exist", name);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn list_records(
        &self,
        domain: &str,
        record_type: RecordType,
        fqdn: &str,
    ) -> Result<Vec<DnsRecord>> {
        tracing::debug!("Listing {} records for {} in {}", record_type, fqdn, domain);

        let request = self
            .client
            .get(self.url(&format!("/domains/{}/records", domain)))
            .query(&[
                ("type", record_type.as_str()),
                ("name", fqdn),
                ("per_page", RECORDS_PER_PAGE),
            ]);

        let response: DomainRecordsResponse = self.send(request, "list records").await?;

        response
            .domain_records
            .into_iter()
            .map(convert_record)
            .collect()
    }

    async fn create_record(&self, domain: &str, request: &RecordRequest) -> Result<DnsRecord> {
        let body = RecordEditRequest::from(request);
        tracing::debug!(
            "Creating {} record {} in {} -> {}",
            body.record_type,
            body.name,
            domain,
            body.data
        );

        let http_request = self
            .client
            .post(self.url(&format!("/domains/{}/records", domain)))
            .json(&body);

        let response: DomainRecordResponse = self.send(http_request, "create record").await?;
        convert_record(response.domain_record)
    }

    async fn update_record(
        &self,
        domain: &str,
        record_id: &str,
        request: &RecordRequest,
    ) -> Result<DnsRecord> {
        let body = RecordEditRequest::from(request);
        tracing::debug!(
            "Editing {} record {} ({}) in {} -> {}",
            body.record_type,
            body.name,
            record_id,
            domain,
            body.data
        );

        let http_request = self
            .client
            .put(self.url(&format!("/domains/{}/records/{}", domain, record_id)))
            .json(&body);

        let response: DomainRecordResponse = self.send(http_request, "update record").await?;
        convert_record(response.domain_record)
    }

    fn provider_name(&self) -> &'static str {
        "digitalocean"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_token_rejected() {
        assert!(matches!(DigitalOceanProvider::new(""), Err(Error::Config(_))));
        assert!(matches!(DigitalOceanProvider::new(" \n"), Err(Error::Config(_))));
    }

    #[test]
    fn test_token_is_trimmed() {
        let provider = DigitalOceanProvider::new("dop_v1_abc\n").unwrap();
        assert_eq!(provider.api_token, "dop_v1_abc");
    }

    #[test]
    fn test_from_config_uses_api_base() {
        let config = ProviderConfig::DigitalOcean {
            api_token: "dop_v1_abc".to_string(),
            api_base: Some("http://localhost:8080/v2/".to_string()),
        };
        let provider = DigitalOceanProvider::from_config(&config).unwrap();
        assert_eq!(provider.base_url, "http://localhost:8080/v2");

        let provider =
            DigitalOceanProvider::from_config(&ProviderConfig::digitalocean("dop_v1_abc")).unwrap();
        assert_eq!(provider.base_url, DIGITALOCEAN_API_BASE);
    }

    #[test]
    fn test_api_token_not_exposed_in_debug() {
        let provider = DigitalOceanProvider::new("secret_token_12345").unwrap();

        let debug_str = format!("{:?}", provider);
        assert!(!debug_str.contains("secret_token_12345"));
        assert!(debug_str.contains("DigitalOceanProvider"));
    }

    #[test]
    fn test_provider_name() {
        let provider = DigitalOceanProvider::new("token").unwrap();
        assert_eq!(provider.provider_name(), "digitalocean");
    }

    #[test]
    fn test_edit_request_uses_apex_marker() {
        let request = RecordRequest::new("", IpAddr::from([192, 0, 2, 1]), 300);
        let body = RecordEditRequest::from(&request);
        assert_eq!(body.name, "@");
        assert_eq!(body.record_type, "A");

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "A", "name": "@", "data": "192.0.2.1", "ttl": 300})
        );
    }

    #[test]
    fn test_convert_record() {
        let record = convert_record(DoDomainRecord {
            id: 3352896,
            record_type: "AAAA".to_string(),
            name: "@".to_string(),
            data: "2001:db8::1".to_string(),
            ttl: 1800,
        })
        .unwrap();

        assert_eq!(record.id, "3352896");
        assert_eq!(record.record_type, RecordType::Aaaa);
        assert_eq!(record.name, "");
        assert_eq!(record.ttl, 1800);
    }

    #[test]
    fn test_convert_record_rejects_bad_data() {
        let bad_ip = DoDomainRecord {
            id: 1,
            record_type: "A".to_string(),
            name: "home".to_string(),
            data: "not-an-ip".to_string(),
            ttl: 300,
        };
        assert!(convert_record(bad_ip).is_err());

        let wrong_family = DoDomainRecord {
            id: 2,
            record_type: "A".to_string(),
            name: "home".to_string(),
            data: "2001:db8::1".to_string(),
            ttl: 300,
        };
        assert!(convert_record(wrong_family).is_err());
    }

    #[test]
    fn test_status_error_mapping() {
        let body = r#"{"id":"not_found","message":"The resource you requested could not be found."}"#;
        let err = status_error(StatusCode::NOT_FOUND, body, "get domain");
        assert!(err.is_not_found());
        assert!(err.to_string().contains("could not be found"));

        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, "", "get domain"),
            Error::Authentication(_)
        ));
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, "", "get domain"),
            Error::RateLimited(_)
        ));
        assert!(matches!(
            status_error(StatusCode::BAD_GATEWAY, "", "get domain"),
            Error::Provider { .. }
        ));
    }
}
