//! # nova-video
//!
//! Rust client for an Amazon Bedrock style video generation API: submit a
//! text or storyboard prompt, poll the job until it finishes, and download
//! the resulting media. The crate also ships the `generate`, `storyboard`,
//! and `check_config` example binaries built on this client.
//!
//! ## Quick start
//!
//! ```no_run
//! use nova_video::{Client, Config, GenerationRequest, PollOptions, TaskType};
//!
//! #[tokio::main]
//! async fn main() -> nova_video::Result<()> {
//!     let config = Config::from_env();
//!     let client = Client::from_config(&config)?;
//!
//!     let request = GenerationRequest::text("A cat playing with a ball")
//!         .duration_ms(config.duration_ms);
//!     let job_id = client.submit(&config.model_id, &request).await?;
//!
//!     let report = client
//!         .wait_for_completion(
//!             &config.model_id,
//!             &job_id,
//!             TaskType::TextToVideo,
//!             &PollOptions::default(),
//!         )
//!         .await?;
//!
//!     if let Some(url) = report.video_url() {
//!         let dest = nova_video::video_path(&config.output_dir, &job_id);
//!         client.download(url, &dest).await?;
//!     }
//!
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod errors;
mod models;

pub use client::{Client, ClientBuilder, STORYBOARD_IMAGE_MODEL_ID};
pub use config::Config;
pub use errors::{Result, TimeoutReason, VideoGenError};
pub use models::{
    image_files_in_dir, storyboard_frame_path, thumbnail_path, video_path, Artifact,
    GenerationRequest, JobReport, JobStatus, PollOptions, StoryboardFrame, TaskType,
};
