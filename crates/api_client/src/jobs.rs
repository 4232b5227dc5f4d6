use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

use crate::error::GitlabClientResult;
use crate::resource::{BaseResource, JOB_TOKEN_HEADER};
use crate::types::{
    to_params, AllJobsOptions, PipelineBridgesOptions, PlayJobOptions, RequestParams, ResourceId,
};

/// Jobs API: <https://docs.gitlab.com/ee/api/jobs.html>
///
/// Every method returns the payload produced by the resource's request
/// helper without interpreting it.
#[derive(Debug, Clone)]
pub struct Jobs {
    base: BaseResource,
}

impl Jobs {
    pub fn new(base: BaseResource) -> Self {
        Self { base }
    }

    pub fn base(&self) -> &BaseResource {
        &self.base
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        self.base.headers()
    }

    /// Mutable headers, e.g. to supply a `job-token` after construction
    pub fn headers_mut(&mut self) -> &mut BTreeMap<String, String> {
        self.base.headers_mut()
    }

    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.base.set_header(name, value);
    }

    /// List project jobs, or the jobs of one pipeline when
    /// `options.pipeline_id` is set. The remaining options become query
    /// parameters; parameters are always sent, possibly empty.
    pub async fn all(
        &self,
        project_id: impl Into<ResourceId>,
        options: Option<AllJobsOptions>,
    ) -> GitlabClientResult<Value> {
        let project_id = project_id.into();
        let options = options.unwrap_or_default();

        let path = match &options.pipeline_id {
            Some(pipeline_id) => format!("projects/{}/pipelines/{}/jobs", project_id, pipeline_id),
            None => format!("projects/{}/jobs", project_id),
        };
        let params = to_params(&options)?;

        self.get(&path, Some(&params)).await
    }

    /// List the bridge (downstream trigger) jobs of a pipeline
    pub async fn all_pipeline_bridges(
        &self,
        project_id: impl Into<ResourceId>,
        pipeline_id: impl Into<ResourceId>,
        options: Option<PipelineBridgesOptions>,
    ) -> GitlabClientResult<Value> {
        let path = format!(
            "projects/{}/pipelines/{}/bridges",
            project_id.into(),
            pipeline_id.into()
        );
        let params = options.as_ref().map(to_params).transpose()?;

        self.get(&path, params.as_ref()).await
    }

    pub async fn show(
        &self,
        project_id: impl Into<ResourceId>,
        job_id: impl Into<ResourceId>,
    ) -> GitlabClientResult<Value> {
        self.get(&job_path(project_id, job_id, None), None).await
    }

    pub async fn cancel(
        &self,
        project_id: impl Into<ResourceId>,
        job_id: impl Into<ResourceId>,
    ) -> GitlabClientResult<Value> {
        self.post(&job_path(project_id, job_id, Some("cancel")), None)
            .await
    }

    pub async fn retry(
        &self,
        project_id: impl Into<ResourceId>,
        job_id: impl Into<ResourceId>,
    ) -> GitlabClientResult<Value> {
        self.post(&job_path(project_id, job_id, Some("retry")), None)
            .await
    }

    /// Trigger a manual job
    pub async fn play(
        &self,
        project_id: impl Into<ResourceId>,
        job_id: impl Into<ResourceId>,
    ) -> GitlabClientResult<Value> {
        self.post(&job_path(project_id, job_id, Some("play")), None)
            .await
    }

    /// Trigger a manual job, passing CI/CD variables to it
    pub async fn play_with_variables(
        &self,
        project_id: impl Into<ResourceId>,
        job_id: impl Into<ResourceId>,
        options: PlayJobOptions,
    ) -> GitlabClientResult<Value> {
        let params = to_params(&options)?;
        self.post(&job_path(project_id, job_id, Some("play")), Some(&params))
            .await
    }

    /// Remove a job's artifacts and log
    pub async fn erase(
        &self,
        project_id: impl Into<ResourceId>,
        job_id: impl Into<ResourceId>,
    ) -> GitlabClientResult<Value> {
        self.post(&job_path(project_id, job_id, Some("erase")), None)
            .await
    }

    /// Prevent a job's artifacts from expiring
    pub async fn keep_artifacts(
        &self,
        project_id: impl Into<ResourceId>,
        job_id: impl Into<ResourceId>,
    ) -> GitlabClientResult<Value> {
        self.post(&job_path(project_id, job_id, Some("artifacts/keep")), None)
            .await
    }

    /// Job log; returned as a string payload by the HTTP requester
    pub async fn show_log(
        &self,
        project_id: impl Into<ResourceId>,
        job_id: impl Into<ResourceId>,
    ) -> GitlabClientResult<Value> {
        self.get(&job_path(project_id, job_id, Some("trace")), None)
            .await
    }

    /// The job owning the `job-token` header
    pub async fn show_connected_job(&self) -> GitlabClientResult<Value> {
        self.require_job_token()?;
        self.get("job", None).await
    }

    /// Kubernetes agents the job owning the `job-token` header may use
    pub async fn show_connected_job_k8s_agents(&self) -> GitlabClientResult<Value> {
        self.require_job_token()?;
        self.get("job/allowed_agents", None).await
    }

    fn require_job_token(&self) -> GitlabClientResult<()> {
        self.base.require_header(JOB_TOKEN_HEADER).map(|_| ()).map_err(|e| {
            warn!("Connected job request without a {} header", JOB_TOKEN_HEADER);
            e
        })
    }

    async fn get(&self, path: &str, params: Option<&RequestParams>) -> GitlabClientResult<Value> {
        self.base.requester().get(&self.base, path, params).await
    }

    async fn post(&self, path: &str, params: Option<&RequestParams>) -> GitlabClientResult<Value> {
        self.base.requester().post(&self.base, path, params).await
    }
}

fn job_path(
    project_id: impl Into<ResourceId>,
    job_id: impl Into<ResourceId>,
    action: Option<&str>,
) -> String {
    let path = format!("projects/{}/jobs/{}", project_id.into(), job_id.into());
    match action {
        Some(action) => format!("{}/{}", path, action),
        None => path,
    }
}
