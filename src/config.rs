//! Environment-backed configuration.
//!
//! All settings are read once into an explicit [`Config`] value at process
//! start and passed by reference from there; nothing reads the environment
//! after that point.

use std::path::PathBuf;

use tracing::warn;

/// Credential environment variables.
pub const ACCESS_KEY_ID_ENV: &str = "AWS_ACCESS_KEY_ID";
pub const SECRET_ACCESS_KEY_ENV: &str = "AWS_SECRET_ACCESS_KEY";

/// Optional overrides.
pub const REGION_ENV: &str = "AWS_REGION";
pub const MODEL_ID_ENV: &str = "DEFAULT_MODEL_ID";
pub const DURATION_ENV: &str = "DEFAULT_DURATION";
pub const IMAGE_QUALITY_ENV: &str = "DEFAULT_IMAGE_QUALITY";
pub const OUTPUT_DIR_ENV: &str = "OUTPUT_DIR";
pub const ENDPOINT_ENV: &str = "BEDROCK_ENDPOINT_URL";

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_MODEL_ID: &str = "amazon.nova.video-1080p";
pub const DEFAULT_DURATION_MS: u64 = 5000;
pub const DEFAULT_IMAGE_QUALITY: &str = "standard";
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Process-wide settings, read-only after load.
#[derive(Debug, Clone)]
pub struct Config {
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub region: String,
    pub model_id: String,
    /// Default video duration in milliseconds.
    pub duration_ms: u64,
    /// "standard" or "premium".
    pub image_quality: String,
    pub output_dir: PathBuf,
    /// Explicit service endpoint; when unset the client derives one from
    /// the region.
    pub endpoint: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            access_key_id: None,
            secret_access_key: None,
            region: DEFAULT_REGION.to_string(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            duration_ms: DEFAULT_DURATION_MS,
            image_quality: DEFAULT_IMAGE_QUALITY.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            endpoint: None,
        }
    }
}

fn env_nonempty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

impl Config {
    /// Read configuration from the environment. Never fails: missing
    /// optional values take their documented defaults, and a malformed
    /// duration is logged and replaced by the default.
    pub fn from_env() -> Self {
        let duration_ms = match env_nonempty(DURATION_ENV) {
            Some(raw) => match raw.parse() {
                Ok(ms) => ms,
                Err(_) => {
                    warn!(
                        "{DURATION_ENV}={raw} is not a valid millisecond count, \
                         using default {DEFAULT_DURATION_MS}"
                    );
                    DEFAULT_DURATION_MS
                }
            },
            None => DEFAULT_DURATION_MS,
        };

        Self {
            access_key_id: env_nonempty(ACCESS_KEY_ID_ENV),
            secret_access_key: env_nonempty(SECRET_ACCESS_KEY_ENV),
            region: env_nonempty(REGION_ENV).unwrap_or_else(|| DEFAULT_REGION.to_string()),
            model_id: env_nonempty(MODEL_ID_ENV).unwrap_or_else(|| DEFAULT_MODEL_ID.to_string()),
            duration_ms,
            image_quality: env_nonempty(IMAGE_QUALITY_ENV)
                .unwrap_or_else(|| DEFAULT_IMAGE_QUALITY.to_string()),
            output_dir: env_nonempty(OUTPUT_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            endpoint: env_nonempty(ENDPOINT_ENV),
        }
    }

    /// Check that both credential values are present. Returns whether they
    /// are, plus the names of the missing ones; logs a warning listing the
    /// missing names. Never errors.
    pub fn validate_credentials(&self) -> (bool, Vec<&'static str>) {
        let mut missing = Vec::new();
        if self.access_key_id.is_none() {
            missing.push(ACCESS_KEY_ID_ENV);
        }
        if self.secret_access_key.is_none() {
            missing.push(SECRET_ACCESS_KEY_ENV);
        }

        if missing.is_empty() {
            (true, missing)
        } else {
            warn!(
                "missing credential environment variables: {}",
                missing.join(", ")
            );
            (false, missing)
        }
    }

    /// Log the effective settings. Credentials are reported as set/unset only.
    pub fn log_summary(&self) {
        tracing::info!("region: {}", self.region);
        tracing::info!("model id: {}", self.model_id);
        tracing::info!("default duration: {}ms", self.duration_ms);
        tracing::info!("image quality: {}", self.image_quality);
        tracing::info!("output directory: {}", self.output_dir.display());
        if let Some(endpoint) = &self.endpoint {
            tracing::info!("endpoint override: {endpoint}");
        }
        if self.access_key_id.is_some() && self.secret_access_key.is_some() {
            tracing::info!("credentials: set");
        } else {
            warn!("credentials: not set");
        }
    }
}
