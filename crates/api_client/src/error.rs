use thiserror::Error;

/// GitLab API client errors
#[derive(Error, Debug)]
pub enum GitlabClientError {
    #[error("Missing required header \"{0}\"")]
    MissingRequiredHeader(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("HTTP error: {status} - {message}")]
    HttpError { status: u16, message: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    #[error("Authorization error: {0}")]
    AuthorizationError(String),

    #[error("Rate limit exceeded: {message}")]
    RateLimitExceeded { message: String },

    #[error("Timeout error: {0}")]
    TimeoutError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Resource not found: {resource}")]
    ResourceNotFound { resource: String },

    #[error("Service unavailable: {service}")]
    ServiceUnavailable { service: String },

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl GitlabClientError {
    /// Get HTTP status code for the error
    pub fn status_code(&self) -> Option<u16> {
        match self {
            GitlabClientError::HttpError { status, .. } => Some(*status),
            GitlabClientError::AuthenticationError(_) => Some(401),
            GitlabClientError::AuthorizationError(_) => Some(403),
            GitlabClientError::ResourceNotFound { .. } => Some(404),
            GitlabClientError::RateLimitExceeded { .. } => Some(429),
            GitlabClientError::TimeoutError(_) => Some(408),
            GitlabClientError::ServiceUnavailable { .. } => Some(503),
            GitlabClientError::InternalError(_) => Some(500),
            _ => None,
        }
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GitlabClientError::NetworkError(_)
                | GitlabClientError::TimeoutError(_)
                | GitlabClientError::ServiceUnavailable { .. }
                | GitlabClientError::InternalError(_)
        )
    }

    /// Get error category
    pub fn category(&self) -> &'static str {
        match self {
            GitlabClientError::MissingRequiredHeader(_) => "header",
            GitlabClientError::NetworkError(_) => "network",
            GitlabClientError::HttpError { .. } => "http",
            GitlabClientError::SerializationError(_) => "serialization",
            GitlabClientError::DeserializationError(_) => "deserialization",
            GitlabClientError::AuthenticationError(_) => "auth",
            GitlabClientError::AuthorizationError(_) => "auth",
            GitlabClientError::RateLimitExceeded { .. } => "rate_limit",
            GitlabClientError::TimeoutError(_) => "timeout",
            GitlabClientError::ConfigError(_) => "config",
            GitlabClientError::ResourceNotFound { .. } => "resource",
            GitlabClientError::ServiceUnavailable { .. } => "service",
            GitlabClientError::InternalError(_) => "internal",
        }
    }
}

/// Result type alias for GitLab API client operations
pub type GitlabClientResult<T> = Result<T, GitlabClientError>;

/// Error body returned by GitLab. Depending on the endpoint the text lives
/// under `message` or `error`, and `message` may itself be an object of
/// field errors.
#[derive(Debug, serde::Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub message: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorResponse {
    /// Best human-readable text carried by the body
    pub fn text(&self) -> Option<String> {
        match (&self.message, &self.error) {
            (Some(serde_json::Value::String(message)), _) => Some(message.clone()),
            (Some(other), _) => Some(other.to_string()),
            (None, Some(error)) => Some(error.clone()),
            (None, None) => None,
        }
    }
}

/// Error handler for API client
pub struct ErrorHandler;

impl ErrorHandler {
    /// Handle HTTP response errors
    pub fn handle_http_error(status: u16, body: &str) -> GitlabClientError {
        let message = serde_json::from_str::<ErrorResponse>(body)
            .ok()
            .and_then(|response| response.text())
            .unwrap_or_else(|| body.to_string());

        match status {
            401 => GitlabClientError::AuthenticationError(message),
            403 => GitlabClientError::AuthorizationError(message),
            404 => GitlabClientError::ResourceNotFound { resource: message },
            408 => GitlabClientError::TimeoutError(message),
            429 => GitlabClientError::RateLimitExceeded { message },
            500 => GitlabClientError::InternalError(message),
            502 | 503 => GitlabClientError::ServiceUnavailable { service: message },
            504 => GitlabClientError::TimeoutError("Gateway timeout".to_string()),
            _ => GitlabClientError::HttpError { status, message },
        }
    }

    /// Handle network errors
    pub fn handle_network_error(error: &reqwest::Error) -> GitlabClientError {
        if error.is_timeout() {
            GitlabClientError::TimeoutError("Request timeout".to_string())
        } else if error.is_connect() {
            GitlabClientError::NetworkError(format!("Connection failed: {}", error))
        } else if error.is_builder() {
            GitlabClientError::ConfigError(error.to_string())
        } else {
            GitlabClientError::NetworkError(error.to_string())
        }
    }

    /// Handle serialization errors
    pub fn handle_serialization_error(error: &serde_json::Error) -> GitlabClientError {
        GitlabClientError::SerializationError(error.to_string())
    }

    /// Handle deserialization errors
    pub fn handle_deserialization_error(error: &serde_json::Error) -> GitlabClientError {
        GitlabClientError::DeserializationError(error.to_string())
    }
}
