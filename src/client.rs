use std::path::{Path, PathBuf};
use std::time::Duration;

use base64::Engine as _;
use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde_json::json;
use tokio::io::AsyncWriteExt;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::errors::{classify_service_error, Result, TimeoutReason, VideoGenError};
use crate::models::{
    GenerationRequest, ImageResponse, JobReport, JobStatus, PollOptions, SubmitResponse, TaskType,
};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Text-to-image model used for storyboard frame generation.
pub const STORYBOARD_IMAGE_MODEL_ID: &str = "stability.stable-diffusion-xl-v1";

fn default_endpoint(region: &str) -> String {
    format!("https://bedrock-runtime.{region}.amazonaws.com")
}

/// Builder for constructing a [`Client`] with custom configuration.
///
/// # Example
///
/// ```no_run
/// use nova_video::ClientBuilder;
/// use std::time::Duration;
///
/// # fn example() -> nova_video::Result<()> {
/// let client = ClientBuilder::new()
///     .region("us-west-2")
///     .credentials("AKIA...", "secret")
///     .timeout(Duration::from_secs(120))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    region: String,
    access_key_id: Option<String>,
    secret_access_key: Option<String>,
    endpoint: Option<String>,
    timeout: Duration,
}

impl ClientBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            region: crate::config::DEFAULT_REGION.to_string(),
            access_key_id: None,
            secret_access_key: None,
            endpoint: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the service region (defaults to `us-east-1`).
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Bind the client to explicit credentials.
    pub fn credentials(mut self, key_id: impl Into<String>, secret: impl Into<String>) -> Self {
        self.access_key_id = Some(key_id.into());
        self.secret_access_key = Some(secret.into());
        self
    }

    /// Override the service endpoint. Useful for testing against a mock server.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the HTTP request timeout (defaults to 60 seconds).
    pub fn timeout(mut self, d: Duration) -> Self {
        self.timeout = d;
        self
    }

    /// Build the [`Client`].
    ///
    /// Missing credentials are not an error: the handle falls back to the
    /// default credential resolution of the environment (an unauthenticated
    /// handle here) and any authorization failure surfaces only when a call
    /// is actually made.
    pub fn build(self) -> Result<Client> {
        let auth = match (&self.access_key_id, &self.secret_access_key) {
            (Some(key_id), Some(secret)) => Some(format!("Credential {key_id}:{secret}")),
            _ => {
                info!("no explicit credentials configured, using the default credential chain");
                None
            }
        };

        let http = reqwest::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .map_err(VideoGenError::Http)?;

        let endpoint = self
            .endpoint
            .unwrap_or_else(|| default_endpoint(&self.region));

        Ok(Client {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            auth,
            http,
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to the remote video generation service.
///
/// Use [`Client::from_config`] for the environment-driven setup the CLI
/// binaries use, or [`ClientBuilder`] for full control.
pub struct Client {
    endpoint: String,
    auth: Option<String>,
    http: reqwest::Client,
}

impl Client {
    /// Build a client from loaded configuration.
    ///
    /// Explicit credentials in the configuration bind the handle to them;
    /// otherwise construction still succeeds and a note is logged.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut builder = ClientBuilder::new().region(&config.region);

        if let (Some(key_id), Some(secret)) =
            (&config.access_key_id, &config.secret_access_key)
        {
            builder = builder.credentials(key_id, secret);
        }
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint(endpoint);
        }

        builder.build()
    }

    /// The resolved service endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Whether the handle carries explicit credentials.
    pub fn is_authenticated(&self) -> bool {
        self.auth.is_some()
    }

    /// Submit a generation request and return the job identifier.
    ///
    /// Issues exactly one invoke call. The response is parsed as JSON and
    /// the `jobId` field is checked explicitly.
    ///
    /// # Errors
    ///
    /// - [`VideoGenError::Validation`] for an empty prompt or storyboard.
    /// - [`VideoGenError::MissingJobId`] when the response has no `jobId`.
    /// - Any classified service error from the invoke call.
    pub async fn submit(&self, model_id: &str, request: &GenerationRequest) -> Result<String> {
        request.validate()?;

        let body = serde_json::to_value(request).map_err(|e| VideoGenError::Unexpected {
            message: format!("failed to serialize request: {e}"),
        })?;

        let value = self.invoke(model_id, &body).await?;
        let response: SubmitResponse =
            serde_json::from_value(value).map_err(|e| VideoGenError::Decode {
                message: e.to_string(),
            })?;

        match response.job_id {
            Some(job_id) if !job_id.is_empty() => {
                info!("job submitted: {job_id}");
                Ok(job_id)
            }
            _ => Err(VideoGenError::MissingJobId),
        }
    }

    /// Fetch the current state of a job. One invoke call, no retries.
    pub async fn job_status(
        &self,
        model_id: &str,
        job_id: &str,
        task_type: TaskType,
    ) -> Result<JobReport> {
        let body = json!({
            "jobId": job_id,
            "taskType": task_type.as_str(),
        });

        let value = self.invoke(model_id, &body).await?;
        serde_json::from_value(value).map_err(|e| VideoGenError::Decode {
            message: e.to_string(),
        })
    }

    /// Poll a job at a fixed interval until it reaches a terminal status
    /// or the wait budget runs out.
    ///
    /// A transient transport failure during a status check does not abort
    /// the wait; it is logged and the check is retried after the interval.
    /// Classified service errors and terminal job states end the wait
    /// immediately.
    ///
    /// # Errors
    ///
    /// - [`VideoGenError::JobTerminated`] when the job reports `failed` or
    ///   `expired`, carrying the vendor error message.
    /// - [`VideoGenError::JobTimeout`] when the attempt budget or the
    ///   wall-clock timeout is exhausted; the two are distinguished in the
    ///   message only.
    pub async fn wait_for_completion(
        &self,
        model_id: &str,
        job_id: &str,
        task_type: TaskType,
        opts: &PollOptions,
    ) -> Result<JobReport> {
        let start = Instant::now();
        let mut attempts = 0u32;

        while attempts < opts.max_attempts && start.elapsed() < opts.timeout {
            match self.job_status(model_id, job_id, task_type).await {
                Ok(report) => {
                    if let Some(cb) = &opts.on_status {
                        cb(report.status);
                    }

                    match report.status {
                        JobStatus::Completed => {
                            info!("job {job_id} completed");
                            return Ok(report);
                        }
                        JobStatus::Failed | JobStatus::Expired => {
                            let message = report
                                .error_message
                                .unwrap_or_else(|| "no error message provided".to_string());
                            return Err(VideoGenError::JobTerminated {
                                job_id: job_id.to_string(),
                                status: report.status,
                                message,
                            });
                        }
                        status => {
                            debug!(
                                "job {job_id} status: {status} (attempt {}/{})",
                                attempts + 1,
                                opts.max_attempts
                            );
                        }
                    }
                }
                Err(VideoGenError::Http(e)) => {
                    // A single failed HTTP call should not abort a
                    // multi-minute wait.
                    warn!("transient error while checking job {job_id}, retrying: {e}");
                }
                Err(e) => return Err(e),
            }

            tokio::time::sleep(opts.interval).await;
            attempts += 1;
        }

        let reason = if start.elapsed() >= opts.timeout {
            TimeoutReason::WallClock {
                waited: start.elapsed(),
            }
        } else {
            TimeoutReason::Attempts { attempts }
        };

        Err(VideoGenError::JobTimeout {
            job_id: job_id.to_string(),
            reason,
        })
    }

    /// Download an artifact URL to a local path, creating parent directories
    /// as needed. The body is streamed to disk; a failed download makes no
    /// promise about partial file contents and should be retried whole.
    ///
    /// # Errors
    ///
    /// Returns [`VideoGenError::Download`] on a non-success transport
    /// status; in that case no file is created at the destination.
    pub async fn download(&self, url: &str, dest: &Path) -> Result<PathBuf> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let response = self.http.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(VideoGenError::Download { status, message });
        }

        let mut file = tokio::fs::File::create(dest).await?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            file.write_all(&chunk?).await?;
        }
        file.flush().await?;

        Ok(dest.to_path_buf())
    }

    /// Generate a single storyboard image from a text prompt and return the
    /// raw image bytes.
    ///
    /// Invokes the text-to-image model through the same envelope and decodes
    /// the first base64 artifact in the response.
    pub async fn generate_storyboard_image(&self, prompt: &str, seed: u32) -> Result<Vec<u8>> {
        if prompt.trim().is_empty() {
            return Err(VideoGenError::validation(
                "a non-empty image prompt is required",
            ));
        }

        let body = json!({
            "text_prompts": [{"text": prompt}],
            "cfg_scale": 7,
            "seed": seed,
            "steps": 30,
            "width": 1024,
            "height": 576,
        });

        let value = self.invoke(STORYBOARD_IMAGE_MODEL_ID, &body).await?;
        let response: ImageResponse =
            serde_json::from_value(value).map_err(|e| VideoGenError::Decode {
                message: e.to_string(),
            })?;

        let artifact = response
            .artifacts
            .first()
            .ok_or_else(|| VideoGenError::Decode {
                message: "response contained no image artifacts".to_string(),
            })?;

        base64::engine::general_purpose::STANDARD
            .decode(&artifact.base64)
            .map_err(|e| VideoGenError::Decode {
                message: format!("invalid base64 image data: {e}"),
            })
    }

    // -----------------------------------------------------------------------
    // Private helpers
    // -----------------------------------------------------------------------

    /// Issue one invoke call and classify any failure.
    ///
    /// A non-success status is mapped through the vendor error code in the
    /// response body; a success body that is not valid JSON is a decode
    /// error; transport failures pass through as `Http`.
    async fn invoke(&self, model_id: &str, body: &serde_json::Value) -> Result<serde_json::Value> {
        let url = format!("{}/model/{}/invoke", self.endpoint, model_id);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(auth) = &self.auth {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(auth).map_err(|_| VideoGenError::Unexpected {
                    message: "credentials contain characters not valid in a header".to_string(),
                })?,
            );
        }

        let response = self
            .http
            .post(&url)
            .headers(headers)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(classify_service_error(status, &text));
        }

        serde_json::from_str(&text).map_err(|e| VideoGenError::Decode {
            message: e.to_string(),
        })
    }
}
