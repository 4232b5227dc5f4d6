use std::env;
use std::fmt;
use std::time::Duration;

use crate::error::{GitlabClientError, GitlabClientResult};

pub const DEFAULT_HOST: &str = "https://gitlab.com";
pub const DEFAULT_API_PREFIX: &str = "api/v4/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Credential used to authenticate against GitLab
#[derive(Clone, PartialEq, Eq)]
pub enum AuthToken {
    /// Personal, project or group access token (`private-token` header)
    Private(String),
    /// OAuth2 bearer token (`authorization` header)
    OAuth(String),
    /// CI job token (`job-token` header)
    Job(String),
}

impl AuthToken {
    /// Header name and value carrying this credential
    pub fn header(&self) -> (&'static str, String) {
        match self {
            AuthToken::Private(token) => ("private-token", token.clone()),
            AuthToken::OAuth(token) => ("authorization", format!("Bearer {}", token)),
            AuthToken::Job(token) => ("job-token", token.clone()),
        }
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthToken::Private(_) => f.write_str("Private(***)"),
            AuthToken::OAuth(_) => f.write_str("OAuth(***)"),
            AuthToken::Job(_) => f.write_str("Job(***)"),
        }
    }
}

/// Connection settings for a GitLab instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub host: String,
    pub api_prefix: String,
    pub token: Option<AuthToken>,
    pub sudo: Option<String>,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            token: None,
            sudo: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> GitlabClientResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Recognised variables: `GITLAB_HOST`, `GITLAB_API_PREFIX`, `GITLAB_TOKEN`,
    /// `GITLAB_OAUTH_TOKEN`, `CI_JOB_TOKEN`, `GITLAB_SUDO` and
    /// `GITLAB_TIMEOUT_SECS`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> GitlabClientResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let mut tokens = [
            var("GITLAB_TOKEN").map(AuthToken::Private),
            var("GITLAB_OAUTH_TOKEN").map(AuthToken::OAuth),
            var("CI_JOB_TOKEN").map(AuthToken::Job),
        ]
        .into_iter()
        .flatten();

        let token = tokens.next();
        if tokens.next().is_some() {
            return Err(GitlabClientError::ConfigError(
                "only one of GITLAB_TOKEN, GITLAB_OAUTH_TOKEN and CI_JOB_TOKEN may be set"
                    .to_string(),
            ));
        }

        let timeout = match var("GITLAB_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|_| {
                    GitlabClientError::ConfigError(format!(
                        "GITLAB_TIMEOUT_SECS must be a whole number of seconds, got {:?}",
                        raw
                    ))
                })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            host: var("GITLAB_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            api_prefix: var("GITLAB_API_PREFIX").unwrap_or_else(|| DEFAULT_API_PREFIX.to_string()),
            token,
            sudo: var("GITLAB_SUDO"),
            timeout,
        })
    }
}
