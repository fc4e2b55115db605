//! REST/HTTP outbound adapter.
//!
//! Delivers each payload as one HTTP request. Batches are posted as a
//! single JSON array. Credentials embedded in the URL never reach messages;
//! the runtime masks the target and the hook boundary scrubs errors.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, StatusCode, Url};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::domain::errors::{AdapterError, AdapterResult};
use crate::domain::models::{
    AdapterConfig, AdapterDirection, AdapterKind, OperationResult, Payload, SendRequest,
};
use crate::domain::ports::{ConnectionCheck, ProtocolAdapter};
use crate::infrastructure::logging::scrubber;
use crate::services::hook_boundary::failure_result;

/// Longest response body excerpt carried in a failure message.
const MAX_BODY_EXCERPT: usize = 512;

#[derive(Debug, Clone)]
struct RestClient {
    http: Client,
    url: Url,
    method: Method,
    auth_token: Option<String>,
    headers: HashMap<String, String>,
    per_item_batches: bool,
}

impl RestClient {
    fn from_config(config: &AdapterConfig) -> AdapterResult<Self> {
        let url = parse_url(config.require_str("url", "Endpoint URL")?)?;

        let method = match config
            .setting_str("method")
            .unwrap_or("POST")
            .to_ascii_uppercase()
            .as_str()
        {
            "POST" => Method::POST,
            "PUT" => Method::PUT,
            other => {
                return Err(AdapterError::config(format!(
                    "Unsupported HTTP method '{other}', expected POST or PUT"
                )))
            }
        };

        let per_item_batches = match config.setting_str("batch_mode").unwrap_or("array") {
            "array" => false,
            "per_item" => true,
            other => {
                return Err(AdapterError::config(format!(
                    "Unsupported batch_mode '{other}', expected array or per_item"
                )))
            }
        };

        let http = Client::builder()
            .connect_timeout(config.timeouts.connect())
            .timeout(config.timeouts.read())
            .user_agent(concat!("switchyard/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| AdapterError::config(format!("Cannot build HTTP client: {err}")))?;

        Ok(Self {
            http,
            url,
            method,
            auth_token: config.setting_str("auth_token").map(str::to_string),
            headers: config.setting_map("headers"),
            per_item_batches,
        })
    }

    fn request(
        &self,
        extra_headers: impl IntoIterator<Item = (String, String)>,
    ) -> reqwest::RequestBuilder {
        let mut request = self.http.request(self.method.clone(), self.url.clone());
        let configured = self.headers.iter().map(|(k, v)| (k.clone(), v.clone()));
        for (name, value) in configured.chain(extra_headers) {
            request = request.header(name, value);
        }
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }
        request
    }

    fn masked_url(&self) -> String {
        scrubber().mask_url(self.url.as_str())
    }
}

fn parse_url(raw: &str) -> AdapterResult<Url> {
    let url = Url::parse(raw)
        .map_err(|err| AdapterError::config(format!("Invalid endpoint URL: {err}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(AdapterError::config(format!(
            "Unsupported URL scheme '{scheme}', expected http or https"
        ))),
    }
}

/// Map an unsuccessful response to an error kind.
///
/// Throttling, timeouts and server errors are transient; everything else
/// points at the request or configuration.
fn status_error(status: StatusCode, body: &str) -> AdapterError {
    let excerpt: String = body.chars().take(MAX_BODY_EXCERPT).collect();
    let message = if excerpt.is_empty() {
        format!("endpoint returned HTTP {}", status.as_u16())
    } else {
        format!("endpoint returned HTTP {}: {excerpt}", status.as_u16())
    };

    if status.is_server_error()
        || status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
    {
        AdapterError::connectivity(message)
    } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        AdapterError::connectivity(format!("authentication rejected, {message}"))
    } else {
        AdapterError::Http(message)
    }
}

/// Sends payloads to an HTTP endpoint.
///
/// Settings:
/// - `url` (required): endpoint URL.
/// - `method` (optional): `POST` or `PUT`, defaults to `POST`.
/// - `auth_token` (optional): bearer token.
/// - `auth_required` (optional): fail the auth check when no token is set.
/// - `headers` (optional): extra headers sent with every request.
/// - `batch_mode` (optional): `array` posts a batch as one JSON array,
///   `per_item` sends every payload separately. Defaults to `array`.
#[derive(Debug)]
pub struct RestOutboundAdapter {
    config: AdapterConfig,
    client: RwLock<Option<RestClient>>,
}

impl RestOutboundAdapter {
    pub fn new(config: AdapterConfig) -> Self {
        Self {
            config,
            client: RwLock::new(None),
        }
    }

    fn client(&self) -> AdapterResult<RestClient> {
        self.client
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| AdapterError::config("REST adapter is not initialized"))
    }

    async fn deliver(
        &self,
        request: reqwest::RequestBuilder,
        records: u64,
    ) -> AdapterResult<OperationResult> {
        let client = self.client()?;
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        debug!(status = status.as_u16(), records, "request delivered");
        let message = format!(
            "Delivered to {} (HTTP {})",
            client.masked_url(),
            status.as_u16()
        );
        let result = match serde_json::from_str::<Value>(&body) {
            Ok(data) => OperationResult::success_with_data(message, data),
            Err(_) => OperationResult::success(message),
        };
        Ok(result
            .with_metadata("status", json!(status.as_u16()))
            .with_records_processed(records))
    }
}

#[async_trait]
impl ProtocolAdapter for RestOutboundAdapter {
    fn kind(&self) -> AdapterKind {
        self.config.kind
    }

    fn direction(&self) -> AdapterDirection {
        AdapterDirection::Outbound
    }

    fn target(&self) -> String {
        self.config.setting_str("url").unwrap_or("<unset>").to_string()
    }

    async fn perform_initialization(&self) -> AdapterResult<OperationResult> {
        let client = RestClient::from_config(&self.config)?;
        let message = format!(
            "REST adapter initialized for {} {}",
            client.method,
            client.masked_url()
        );
        *self.client.write().unwrap_or_else(PoisonError::into_inner) = Some(client);
        Ok(OperationResult::success(message))
    }

    async fn perform_start(&self) -> AdapterResult<OperationResult> {
        self.client()?;
        Ok(OperationResult::success("REST adapter started"))
    }

    async fn perform_stop(&self) -> AdapterResult<OperationResult> {
        Ok(OperationResult::success("REST adapter stopped"))
    }

    async fn perform_shutdown(&self) -> AdapterResult<OperationResult> {
        // Dropping the client closes its idle connections.
        *self.client.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(OperationResult::success("REST adapter released"))
    }

    fn connection_checks(&self) -> Vec<ConnectionCheck<'_>> {
        vec![
            ConnectionCheck::new("url syntax", async {
                let url = parse_url(self.config.require_str("url", "Endpoint URL")?)?;
                Ok(OperationResult::success(format!(
                    "URL is valid: {}",
                    scrubber().mask_url(url.as_str())
                )))
            }),
            ConnectionCheck::new("endpoint reachable", async {
                let client = self.client()?;
                let response = client.http.head(client.url.clone()).send().await?;
                Ok(OperationResult::success(format!(
                    "Endpoint answered HTTP {}",
                    response.status().as_u16()
                )))
            }),
            ConnectionCheck::new("auth configured", async {
                let token = self.config.setting_str("auth_token");
                let required = self.config.setting_bool("auth_required").unwrap_or(false);
                Ok(match (token, required) {
                    (Some(_), _) => OperationResult::success("Bearer token configured"),
                    (None, true) => OperationResult::failure(
                        "auth_token is required when auth_required is set",
                    ),
                    (None, false) => OperationResult::success("No authentication required"),
                })
            }),
        ]
    }

    async fn send(&self, request: &SendRequest) -> AdapterResult<OperationResult> {
        let client = self.client()?;
        let http_request = client
            .request(request.headers.clone())
            .header(CONTENT_TYPE, request.payload.content_type())
            .body(request.payload.to_bytes());
        self.deliver(http_request, 1).await
    }

    async fn write_batch(
        &self,
        items: Vec<Payload>,
        batch_number: u64,
    ) -> AdapterResult<OperationResult> {
        let client = self.client()?;
        let count = items.len() as u64;
        let batch_header = ("X-Batch-Number".to_string(), batch_number.to_string());

        if client.per_item_batches {
            info!(batch_number, items = count, "sending batch item by item");
            let mut results = Vec::with_capacity(items.len());
            for item in &items {
                let http_request = client
                    .request([batch_header.clone()])
                    .header(CONTENT_TYPE, item.content_type())
                    .body(item.to_bytes());
                let outcome = self.deliver(http_request, 1).await;
                results.push(outcome.unwrap_or_else(|err| failure_result(&err)));
            }
            return Ok(OperationResult::aggregate_batch(results));
        }

        info!(batch_number, items = count, "posting batch");
        let body = Value::Array(items.iter().map(Payload::to_json).collect());
        let http_request = client.request([batch_header]).json(&body);
        self.deliver(http_request, count).await
    }
}
