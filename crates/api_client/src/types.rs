use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ErrorHandler, GitlabClientError, GitlabClientResult};

/// Parameters forwarded to the request helper. Serialized as a query string
/// for GET requests and as a JSON body for POST requests.
pub type RequestParams = serde_json::Map<String, serde_json::Value>;

/// Serialize an options struct into request params
pub fn to_params<T: Serialize>(options: &T) -> GitlabClientResult<RequestParams> {
    match serde_json::to_value(options) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(other) => Err(GitlabClientError::SerializationError(format!(
            "expected an object of parameters, got {}",
            other
        ))),
        Err(e) => Err(ErrorHandler::handle_serialization_error(&e)),
    }
}

/// Project, pipeline or job identifier.
///
/// Paths such as `group/project` are percent-encoded when rendered into a URL
/// path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceId {
    Number(i64),
    Path(String),
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceId::Number(id) => write!(f, "{}", id),
            ResourceId::Path(path) => f.write_str(&urlencoding::encode(path)),
        }
    }
}

impl From<i32> for ResourceId {
    fn from(id: i32) -> Self {
        ResourceId::Number(i64::from(id))
    }
}

impl From<i64> for ResourceId {
    fn from(id: i64) -> Self {
        ResourceId::Number(id)
    }
}

impl From<u32> for ResourceId {
    fn from(id: u32) -> Self {
        ResourceId::Number(i64::from(id))
    }
}

impl From<&str> for ResourceId {
    fn from(path: &str) -> Self {
        path.to_string().into()
    }
}

impl From<String> for ResourceId {
    fn from(path: String) -> Self {
        match path.parse::<i64>() {
            Ok(id) => ResourceId::Number(id),
            Err(_) => ResourceId::Path(path),
        }
    }
}

impl From<&ResourceId> for ResourceId {
    fn from(id: &ResourceId) -> Self {
        id.clone()
    }
}

/// Job status used to filter job listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobScope {
    Created,
    Pending,
    Running,
    Failed,
    Success,
    Canceled,
    Skipped,
    WaitingForResource,
    Manual,
}

impl JobScope {
    pub const ALL: [JobScope; 9] = [
        JobScope::Created,
        JobScope::Pending,
        JobScope::Running,
        JobScope::Failed,
        JobScope::Success,
        JobScope::Canceled,
        JobScope::Skipped,
        JobScope::WaitingForResource,
        JobScope::Manual,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobScope::Created => "created",
            JobScope::Pending => "pending",
            JobScope::Running => "running",
            JobScope::Failed => "failed",
            JobScope::Success => "success",
            JobScope::Canceled => "canceled",
            JobScope::Skipped => "skipped",
            JobScope::WaitingForResource => "waiting_for_resource",
            JobScope::Manual => "manual",
        }
    }
}

impl fmt::Display for JobScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobScope {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        JobScope::ALL
            .iter()
            .copied()
            .find(|scope| scope.as_str() == value)
            .ok_or_else(|| format!("unknown job scope: {}", value))
    }
}

/// One scope or an ordered set of scopes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScopeFilter {
    One(JobScope),
    Many(Vec<JobScope>),
}

impl From<JobScope> for ScopeFilter {
    fn from(scope: JobScope) -> Self {
        ScopeFilter::One(scope)
    }
}

impl From<Vec<JobScope>> for ScopeFilter {
    fn from(scopes: Vec<JobScope>) -> Self {
        ScopeFilter::Many(scopes)
    }
}

impl<const N: usize> From<[JobScope; N]> for ScopeFilter {
    fn from(scopes: [JobScope; N]) -> Self {
        ScopeFilter::Many(scopes.to_vec())
    }
}

/// Options for listing project or pipeline jobs
#[derive(Debug, Clone, Default, Serialize)]
pub struct AllJobsOptions {
    /// Selects the pipeline jobs endpoint. Never forwarded as a parameter.
    #[serde(skip)]
    pub pipeline_id: Option<ResourceId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<ScopeFilter>,
    /// Only honoured by the pipeline jobs endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_retried: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    #[serde(flatten)]
    pub extra: RequestParams,
}

impl AllJobsOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pipeline(mut self, pipeline_id: impl Into<ResourceId>) -> Self {
        self.pipeline_id = Some(pipeline_id.into());
        self
    }

    pub fn with_scope(mut self, scope: impl Into<ScopeFilter>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn with_include_retried(mut self, include_retried: bool) -> Self {
        self.include_retried = Some(include_retried);
        self
    }

    pub fn with_page(mut self, page: u32, per_page: u32) -> Self {
        self.page = Some(page);
        self.per_page = Some(per_page);
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Options for listing the bridge jobs of a pipeline
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineBridgesOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<ScopeFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    #[serde(flatten)]
    pub extra: RequestParams,
}

impl PipelineBridgesOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scope(mut self, scope: impl Into<ScopeFilter>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn with_page(mut self, page: u32, per_page: u32) -> Self {
        self.page = Some(page);
        self.per_page = Some(per_page);
        self
    }
}

/// CI/CD variable passed to a manual job when it is played
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobVariable {
    pub key: String,
    pub value: String,
}

/// Options for playing a manual job
#[derive(Debug, Clone, Default, Serialize)]
pub struct PlayJobOptions {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub job_variables_attributes: Vec<JobVariable>,
}

impl PlayJobOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.job_variables_attributes.push(JobVariable {
            key: key.into(),
            value: value.into(),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resource_id_encodes_paths() {
        assert_eq!(ResourceId::from(42).to_string(), "42");
        assert_eq!(ResourceId::from("7").to_string(), "7");
        assert_eq!(
            ResourceId::from("group/subgroup/project").to_string(),
            "group%2Fsubgroup%2Fproject"
        );
    }

    #[test]
    fn test_scope_round_trips_through_strings() {
        for scope in JobScope::ALL {
            assert_eq!(scope.to_string().parse::<JobScope>(), Ok(scope));
        }
        assert!("queued".parse::<JobScope>().is_err());
        assert_eq!(
            serde_json::to_value(JobScope::WaitingForResource).unwrap(),
            json!("waiting_for_resource")
        );
    }

    #[test]
    fn test_all_jobs_options_strip_pipeline_id() {
        let options = AllJobsOptions::new()
            .with_pipeline(2)
            .with_scope(JobScope::Failed);
        let params = to_params(&options).unwrap();
        assert_eq!(serde_json::Value::Object(params), json!({ "scope": "failed" }));
    }

    #[test]
    fn test_all_jobs_options_forward_arrays_and_extras() {
        let options = AllJobsOptions::new()
            .with_scope([JobScope::Pending, JobScope::Running])
            .with_include_retried(true)
            .with_page(2, 50)
            .with_param("order_by", "id");
        let params = to_params(&options).unwrap();
        assert_eq!(
            serde_json::Value::Object(params),
            json!({
                "scope": ["pending", "running"],
                "include_retried": true,
                "page": 2,
                "per_page": 50,
                "order_by": "id"
            })
        );
    }

    #[test]
    fn test_default_options_are_empty() {
        assert!(to_params(&AllJobsOptions::default()).unwrap().is_empty());
        assert!(to_params(&PlayJobOptions::default()).unwrap().is_empty());
    }

    #[test]
    fn test_play_options_serialize_variables() {
        let options = PlayJobOptions::new().with_variable("DEPLOY_ENV", "staging");
        assert_eq!(
            serde_json::Value::Object(to_params(&options).unwrap()),
            json!({ "job_variables_attributes": [{ "key": "DEPLOY_ENV", "value": "staging" }] })
        );
    }
}
