use crate::error::{ErrorHandler, GitlabClientError, GitlabClientResult};
use crate::resource::BaseResource;
use crate::types::RequestParams;
use crate::RequestHelper;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use tracing::{debug, warn};

/// reqwest-backed [`RequestHelper`]
#[derive(Debug, Clone, Default)]
pub struct HttpRequester {
    client: reqwest::Client,
}

impl HttpRequester {
    /// Create a new HTTP requester
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Set custom HTTP client
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Attach the resource headers, send, and turn the response into a payload
    async fn send(
        &self,
        resource: &BaseResource,
        mut request: reqwest::RequestBuilder,
        method: &str,
        url: &str,
    ) -> GitlabClientResult<Value> {
        for (name, value) in resource.headers() {
            request = request.header(name.as_str(), value.as_str());
        }

        debug!(method, url, "Sending GitLab request");

        let response = request.send().await.map_err(|e| {
            warn!(method, url, error = %e, "GitLab request failed to send");
            ErrorHandler::handle_network_error(&e)
        })?;

        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.contains("json"))
            .unwrap_or(false);
        let body = response
            .text()
            .await
            .map_err(|e| GitlabClientError::NetworkError(e.to_string()))?;

        if status.is_success() {
            debug!(method, url, status = status.as_u16(), "GitLab request succeeded");
            parse_payload(&body, is_json)
        } else {
            warn!(method, url, status = status.as_u16(), "GitLab request rejected");
            Err(ErrorHandler::handle_http_error(status.as_u16(), &body))
        }
    }
}

#[async_trait]
impl RequestHelper for HttpRequester {
    async fn get(
        &self,
        resource: &BaseResource,
        path: &str,
        params: Option<&RequestParams>,
    ) -> GitlabClientResult<Value> {
        let url = resource.endpoint(path);
        let mut request = self.client.get(&url).timeout(resource.timeout());

        if let Some(params) = params {
            let query = encode_query(params);
            if !query.is_empty() {
                request = request.query(&query);
            }
        }

        self.send(resource, request, "GET", &url).await
    }

    async fn post(
        &self,
        resource: &BaseResource,
        path: &str,
        params: Option<&RequestParams>,
    ) -> GitlabClientResult<Value> {
        let url = resource.endpoint(path);
        let mut request = self.client.post(&url).timeout(resource.timeout());

        if let Some(params) = params {
            request = request.json(params);
        }

        self.send(resource, request, "POST", &url).await
    }
}

/// JSON responses are parsed; anything else (job traces) is passed through as text
fn parse_payload(body: &str, is_json: bool) -> GitlabClientResult<Value> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    if is_json {
        serde_json::from_str(body).map_err(|e| ErrorHandler::handle_deserialization_error(&e))
    } else {
        Ok(Value::String(body.to_string()))
    }
}

/// Flatten params into query pairs using GitLab's `key[]=value` form for arrays.
/// Nulls are dropped; nested objects are sent as JSON text.
pub fn encode_query(params: &RequestParams) -> Vec<(String, String)> {
    let mut pairs = Vec::with_capacity(params.len());
    for (key, value) in params {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                let key = format!("{}[]", key);
                pairs.extend(
                    items
                        .iter()
                        .filter_map(query_value)
                        .map(|item| (key.clone(), item)),
                );
            }
            other => {
                if let Some(item) = query_value(other) {
                    pairs.push((key.clone(), item));
                }
            }
        }
    }
    pairs
}

fn query_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
