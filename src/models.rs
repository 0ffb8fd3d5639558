use std::path::{Path, PathBuf};
use std::time::Duration;

use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, VideoGenError};

/// Remote job status. The service is the sole owner of this state; the
/// client only ever re-fetches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Submitted,
    Running,
    Completed,
    Failed,
    Expired,
    /// Any status string outside the documented set. Treated as still
    /// in progress by the poller.
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    /// Terminal = no further transition will occur.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Expired
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Submitted => "submitted",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Expired => "expired",
            JobStatus::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which generation task a request or status check refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskType {
    #[serde(rename = "text-to-video")]
    TextToVideo,
    #[serde(rename = "image-to-video")]
    ImageToVideo,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::TextToVideo => "text-to-video",
            TaskType::ImageToVideo => "image-to-video",
        }
    }
}

/// One base64-encoded storyboard image, in presentation order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryboardFrame {
    #[serde(rename = "base64EncodedImage")]
    pub base64_encoded_image: String,
}

impl StoryboardFrame {
    /// Read an image file and encode it as a storyboard frame.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path.as_ref()).await?;
        Ok(Self {
            base64_encoded_image: base64::engine::general_purpose::STANDARD.encode(bytes),
        })
    }
}

/// File extensions accepted as storyboard images.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif", "webp"];

/// List the image files in a directory, sorted lexicographically by name.
pub fn image_files_in_dir(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| {
                        IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
                    })
        })
        .collect();

    files.sort();
    Ok(files)
}

/// Payload for one generation request. Immutable once constructed; use the
/// chained setters before submitting.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storyboard: Option<Vec<StoryboardFrame>>,
    pub seed: u32,
    /// Duration in milliseconds.
    pub duration: u64,
    pub aspect_ratio: String,
    pub job_type: String,
    pub task_type: TaskType,
    pub image_quality: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_preset: Option<String>,
}

const JOB_TYPE_VIDEO_GENERATION: &str = "video-generation";

impl GenerationRequest {
    /// A text-to-video request with default parameters and a fresh random seed.
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: Some(prompt.into()),
            storyboard: None,
            seed: rand::random(),
            duration: 4000,
            aspect_ratio: "16:9".to_string(),
            job_type: JOB_TYPE_VIDEO_GENERATION.to_string(),
            task_type: TaskType::TextToVideo,
            image_quality: "standard".to_string(),
            negative_prompt: None,
            style_preset: None,
        }
    }

    /// An image-to-video request from an ordered sequence of storyboard frames.
    pub fn storyboard(frames: Vec<StoryboardFrame>) -> Self {
        Self {
            prompt: None,
            storyboard: Some(frames),
            seed: rand::random(),
            duration: 6000,
            aspect_ratio: "16:9".to_string(),
            job_type: JOB_TYPE_VIDEO_GENERATION.to_string(),
            task_type: TaskType::ImageToVideo,
            image_quality: "standard".to_string(),
            negative_prompt: None,
            style_preset: None,
        }
    }

    /// Override the generated seed with an explicit value.
    pub fn seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    /// Set the video duration in milliseconds.
    pub fn duration_ms(mut self, duration: u64) -> Self {
        self.duration = duration;
        self
    }

    pub fn aspect_ratio(mut self, ratio: impl Into<String>) -> Self {
        self.aspect_ratio = ratio.into();
        self
    }

    /// "standard" or "premium".
    pub fn image_quality(mut self, quality: impl Into<String>) -> Self {
        self.image_quality = quality.into();
        self
    }

    pub fn negative_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.negative_prompt = Some(prompt.into());
        self
    }

    pub fn style_preset(mut self, preset: impl Into<String>) -> Self {
        self.style_preset = Some(preset.into());
        self
    }

    /// Reject payloads the service would never accept, before any call is made.
    pub(crate) fn validate(&self) -> Result<()> {
        match self.task_type {
            TaskType::TextToVideo => {
                if self.prompt.as_deref().map(str::trim).unwrap_or("").is_empty() {
                    return Err(VideoGenError::validation(
                        "a non-empty text prompt is required",
                    ));
                }
            }
            TaskType::ImageToVideo => {
                if self.storyboard.as_deref().unwrap_or(&[]).is_empty() {
                    return Err(VideoGenError::validation(
                        "at least one storyboard image is required",
                    ));
                }
            }
        }
        Ok(())
    }
}

/// A downloadable result referenced by URL in a completed job.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Artifact {
    pub url: String,
}

/// Snapshot of a remote job as reported by a status check.
#[derive(Debug, Clone, Deserialize)]
pub struct JobReport {
    #[serde(default, rename = "jobId")]
    pub job_id: Option<String>,
    pub status: JobStatus,
    #[serde(default, rename = "errorMessage")]
    pub error_message: Option<String>,
    #[serde(default)]
    pub videos: Vec<Artifact>,
    #[serde(default)]
    pub thumbnails: Vec<Artifact>,
}

impl JobReport {
    /// URL of the first video artifact, if any.
    pub fn video_url(&self) -> Option<&str> {
        self.videos.first().map(|a| a.url.as_str())
    }

    /// URL of the first thumbnail artifact, if any.
    pub fn thumbnail_url(&self) -> Option<&str> {
        self.thumbnails.first().map(|a| a.url.as_str())
    }
}

/// Submission response. `job_id` is optional here so its absence can be
/// reported as a distinct error instead of a decode failure.
#[derive(Debug, Deserialize)]
pub(crate) struct SubmitResponse {
    #[serde(default, rename = "jobId")]
    pub job_id: Option<String>,
}

/// Text-to-image response used for storyboard frame generation.
#[derive(Debug, Deserialize)]
pub(crate) struct ImageResponse {
    #[serde(default)]
    pub artifacts: Vec<ImageArtifact>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImageArtifact {
    pub base64: String,
}

/// Polling configuration for [`Client::wait_for_completion`](crate::Client::wait_for_completion).
pub struct PollOptions {
    /// Delay between status checks. Default: 5s.
    pub interval: Duration,
    /// Maximum number of status checks. Default: 60.
    pub max_attempts: u32,
    /// Wall-clock budget for the whole wait. Default: 5 minutes.
    pub timeout: Duration,
    /// Called with the reported status on each successful check.
    #[allow(clippy::type_complexity)]
    pub on_status: Option<Box<dyn Fn(JobStatus) + Send>>,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_attempts: 60,
            timeout: Duration::from_secs(300),
            on_status: None,
        }
    }
}

/// `<output-dir>/video_<jobId>.mp4`
pub fn video_path(output_dir: &Path, job_id: &str) -> PathBuf {
    output_dir.join(format!("video_{job_id}.mp4"))
}

/// `<output-dir>/thumbnail_<jobId>.jpg`
pub fn thumbnail_path(output_dir: &Path, job_id: &str) -> PathBuf {
    output_dir.join(format!("thumbnail_{job_id}.jpg"))
}

/// `<output-dir>/storyboard/storyboard_<NN>.png` (1-based frame numbering)
pub fn storyboard_frame_path(output_dir: &Path, frame_number: usize) -> PathBuf {
    output_dir
        .join("storyboard")
        .join(format!("storyboard_{frame_number:02}.png"))
}
