use std::time::Duration;

use thiserror::Error;

/// All errors that can occur when talking to the video generation service.
#[derive(Error, Debug)]
pub enum VideoGenError {
    /// The caller is not allowed to invoke the model (vendor `AccessDeniedException`).
    #[error("access denied ({code}): {message}")]
    AccessDenied { code: String, message: String },

    /// The request was rejected as invalid, either by the service
    /// (vendor `ValidationException`) or by client-side checks.
    #[error("validation failure ({code}): {message}")]
    Validation { code: String, message: String },

    /// The model or endpoint does not exist (vendor `ResourceNotFoundException`).
    #[error("resource not found ({code}): {message}")]
    NotFound { code: String, message: String },

    /// The request was throttled (vendor `ThrottlingException`).
    #[error("throttled ({code}): {message}")]
    Throttled { code: String, message: String },

    /// The account's service quota was exceeded (vendor `ServiceQuotaExceededException`).
    #[error("quota exceeded ({code}): {message}")]
    QuotaExceeded { code: String, message: String },

    /// A service error with a vendor code outside the recognized set.
    #[error("service error ({code}): {message}")]
    Service { code: String, message: String },

    /// A response body that could not be parsed as the expected JSON.
    #[error("failed to decode response body: {message}")]
    Decode { message: String },

    /// Catch-all for failures that fit no other category. The original
    /// error type is not preserved; callers branch on this taxonomy only.
    #[error("unexpected error: {message}")]
    Unexpected { message: String },

    /// A submission response that did not contain a `jobId` field.
    #[error("response did not contain a job id")]
    MissingJobId,

    /// The job reached a terminal `failed` or `expired` status.
    #[error("job {job_id} {status}: {message}")]
    JobTerminated {
        job_id: String,
        status: crate::models::JobStatus,
        message: String,
    },

    /// Polling gave up before the job reached a terminal status.
    #[error("job {job_id} did not complete: {reason}")]
    JobTimeout {
        job_id: String,
        reason: TimeoutReason,
    },

    /// An artifact download returned a non-success transport status.
    #[error("download failed with status {status}: {message}")]
    Download { status: u16, message: String },

    /// A transport-level HTTP error from reqwest. The poller treats these
    /// as transient and retries after the polling interval.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// An I/O error, typically from writing a downloaded artifact.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl VideoGenError {
    /// Shorthand for a client-side validation failure.
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        VideoGenError::Validation {
            code: "ValidationException".to_string(),
            message: message.into(),
        }
    }
}

/// Why a poll loop gave up. One error kind; the distinction between the
/// wall-clock deadline and the attempt budget is informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutReason {
    /// The wall-clock timeout elapsed first.
    WallClock { waited: Duration },
    /// The attempt budget was exhausted first.
    Attempts { attempts: u32 },
}

impl std::fmt::Display for TimeoutReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeoutReason::WallClock { waited } => {
                write!(f, "exceeded wall-clock timeout of {waited:?}")
            }
            TimeoutReason::Attempts { attempts } => {
                write!(f, "exceeded attempt budget of {attempts}")
            }
        }
    }
}

/// Map a non-success invoke response to a domain error.
///
/// The service reports errors as a JSON body carrying a vendor code
/// (`code` or namespaced `__type`) and a message. Recognized codes map to
/// their own variants; anything else becomes [`VideoGenError::Service`].
/// A body that is not JSON at all is kept verbatim in a `Service` error.
pub(crate) fn classify_service_error(status: reqwest::StatusCode, body: &str) -> VideoGenError {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();

    let code = parsed
        .as_ref()
        .and_then(|b| {
            b.get("code")
                .or_else(|| b.get("__type"))
                .and_then(|v| v.as_str())
        })
        // "__type" may be namespaced, e.g. "com.amazon.service#ThrottlingException".
        .map(|t| t.rsplit('#').next().unwrap_or(t).to_string())
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

    let message = parsed
        .as_ref()
        .and_then(|b| {
            b.get("message")
                .or_else(|| b.get("Message"))
                .and_then(|v| v.as_str())
        })
        .unwrap_or(body)
        .to_string();

    match code.as_str() {
        "AccessDeniedException" => VideoGenError::AccessDenied { code, message },
        "ValidationException" => VideoGenError::Validation { code, message },
        "ResourceNotFoundException" => VideoGenError::NotFound { code, message },
        "ThrottlingException" => VideoGenError::Throttled { code, message },
        "ServiceQuotaExceededException" => VideoGenError::QuotaExceeded { code, message },
        _ => VideoGenError::Service { code, message },
    }
}

/// A convenience alias for `Result<T, VideoGenError>`.
pub type Result<T> = std::result::Result<T, VideoGenError>;
