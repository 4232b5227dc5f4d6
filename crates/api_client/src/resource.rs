use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::client::HttpRequester;
use crate::config::{AuthToken, ClientConfig, DEFAULT_API_PREFIX, DEFAULT_HOST, DEFAULT_TIMEOUT_SECS};
use crate::error::{GitlabClientError, GitlabClientResult};
use crate::RequestHelper;

pub const JOB_TOKEN_HEADER: &str = "job-token";
pub const SUDO_HEADER: &str = "sudo";

/// State shared by every API resource: where to send requests, which headers
/// to attach and the request helper that performs them.
#[derive(Clone)]
pub struct BaseResource {
    url: String,
    headers: BTreeMap<String, String>,
    timeout: Duration,
    requester: Arc<dyn RequestHelper>,
}

impl BaseResource {
    pub fn builder() -> ResourceBuilder {
        ResourceBuilder::new()
    }

    /// API root, always ending in `/`
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Absolute URL for a resource path
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.url, path.trim_start_matches('/'))
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn requester(&self) -> &Arc<dyn RequestHelper> {
        &self.requester
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut BTreeMap<String, String> {
        &mut self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Set a header; names are stored lowercase
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
    }

    pub fn remove_header(&mut self, name: &str) -> Option<String> {
        self.headers.remove(&name.to_ascii_lowercase())
    }

    /// Value of a header that must be present and non-empty
    pub fn require_header(&self, name: &str) -> GitlabClientResult<&str> {
        match self.header(name) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(GitlabClientError::MissingRequiredHeader(name.to_string())),
        }
    }
}

impl fmt::Debug for BaseResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseResource")
            .field("url", &self.url)
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Builder for [`BaseResource`]
pub struct ResourceBuilder {
    host: String,
    api_prefix: String,
    token: Option<AuthToken>,
    sudo: Option<String>,
    timeout: Duration,
    headers: BTreeMap<String, String>,
    requester: Option<Arc<dyn RequestHelper>>,
}

impl ResourceBuilder {
    pub fn new() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            token: None,
            sudo: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            headers: BTreeMap::new(),
            requester: None,
        }
    }

    /// Start from loaded connection settings
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            host: config.host.clone(),
            api_prefix: config.api_prefix.clone(),
            token: config.token.clone(),
            sudo: config.sudo.clone(),
            timeout: config.timeout,
            ..Self::new()
        }
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = prefix.into();
        self
    }

    pub fn token(mut self, token: AuthToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Perform requests on behalf of another user (admin tokens only)
    pub fn sudo(mut self, user: impl Into<String>) -> Self {
        self.sudo = Some(user.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    /// Use a custom request helper instead of the reqwest transport
    pub fn requester(mut self, requester: Arc<dyn RequestHelper>) -> Self {
        self.requester = Some(requester);
        self
    }

    pub fn build(self) -> GitlabClientResult<BaseResource> {
        let host = self.host.trim().trim_end_matches('/');
        if host.is_empty() {
            return Err(GitlabClientError::ConfigError("Host is required".to_string()));
        }
        if !(host.starts_with("http://") || host.starts_with("https://")) {
            return Err(GitlabClientError::ConfigError(format!(
                "Host must be an http(s) URL, got {}",
                host
            )));
        }

        let prefix = self.api_prefix.trim_matches('/');
        let url = if prefix.is_empty() {
            format!("{}/", host)
        } else {
            format!("{}/{}/", host, prefix)
        };

        let mut headers = self.headers;
        if let Some(token) = &self.token {
            let (name, value) = token.header();
            headers.insert(name.to_string(), value);
        }
        if let Some(sudo) = self.sudo {
            headers.insert(SUDO_HEADER.to_string(), sudo);
        }

        let requester: Arc<dyn RequestHelper> = match self.requester {
            Some(requester) => requester,
            None => Arc::new(HttpRequester::new()),
        };

        Ok(BaseResource {
            url,
            headers,
            timeout: self.timeout,
            requester,
        })
    }
}

impl Default for ResourceBuilder {
    fn default() -> Self {
        Self::new()
    }
}
