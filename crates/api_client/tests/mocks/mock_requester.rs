// Recording request helper for testing
// Captures every call a resource makes instead of sending it

use async_trait::async_trait;
use gitlab_api_client::{BaseResource, GitlabClientResult, RequestHelper, RequestParams};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: &'static str,
    pub path: String,
    pub params: Option<RequestParams>,
    pub resource_url: String,
    pub headers: BTreeMap<String, String>,
}

/// Mock request helper returning a fixed payload
pub struct MockRequester {
    pub response: Value,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockRequester {
    pub fn new() -> Self {
        Self {
            response: Value::Null,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_response(mut self, response: Value) -> Self {
        self.response = response;
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// The only call made so far
    pub fn single_call(&self) -> RecordedCall {
        let calls = self.calls();
        assert_eq!(calls.len(), 1, "expected exactly one request, got {:?}", calls);
        calls.into_iter().next().unwrap()
    }

    fn record(
        &self,
        method: &'static str,
        resource: &BaseResource,
        path: &str,
        params: Option<&RequestParams>,
    ) -> GitlabClientResult<Value> {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            path: path.to_string(),
            params: params.cloned(),
            resource_url: resource.url().to_string(),
            headers: resource.headers().clone(),
        });
        Ok(self.response.clone())
    }
}

impl Default for MockRequester {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RequestHelper for MockRequester {
    async fn get(
        &self,
        resource: &BaseResource,
        path: &str,
        params: Option<&RequestParams>,
    ) -> GitlabClientResult<Value> {
        self.record("GET", resource, path, params)
    }

    async fn post(
        &self,
        resource: &BaseResource,
        path: &str,
        params: Option<&RequestParams>,
    ) -> GitlabClientResult<Value> {
        self.record("POST", resource, path, params)
    }
}
