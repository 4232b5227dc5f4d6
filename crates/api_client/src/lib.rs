//! Client for the GitLab Jobs REST API.
//!
//! [`Jobs`] maps each operation onto an HTTP verb, a path under the API root
//! and an optional set of parameters, then hands the request to the
//! [`RequestHelper`] held by its [`BaseResource`]. The default helper is the
//! reqwest-backed [`HttpRequester`]; tests and embedders can inject their own.

use async_trait::async_trait;

pub mod client;
pub mod config;
pub mod error;
pub mod jobs;
pub mod resource;
pub mod types;

pub use client::*;
pub use config::*;
pub use error::*;
pub use jobs::*;
pub use resource::*;
pub use types::*;

/// Executes requests on behalf of a resource.
///
/// `params` is `None` when the caller forwarded nothing, which is distinct
/// from an empty set of parameters.
#[async_trait]
pub trait RequestHelper: Send + Sync {
    async fn get(
        &self,
        resource: &BaseResource,
        path: &str,
        params: Option<&RequestParams>,
    ) -> GitlabClientResult<serde_json::Value>;

    async fn post(
        &self,
        resource: &BaseResource,
        path: &str,
        params: Option<&RequestParams>,
    ) -> GitlabClientResult<serde_json::Value>;
}
