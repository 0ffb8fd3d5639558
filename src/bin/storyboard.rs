//! Storyboard-based (image-to-video) generation example.
//!
//! Either generates storyboard frames from a list of scene prompts, one
//! image request at a time with a fixed delay between calls, or reuses the
//! images found in an existing directory (sorted by file name). The frames
//! are then submitted as a single image-to-video job.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info, warn};

use nova_video::{
    image_files_in_dir, storyboard_frame_path, thumbnail_path, video_path, Client, Config,
    GenerationRequest, PollOptions, StoryboardFrame, TaskType, VideoGenError,
};

/// Fixed pacing between sequential image generation calls.
const IMAGE_REQUEST_DELAY: Duration = Duration::from_secs(1);

/// Generate a video from a storyboard of images.
#[derive(Parser, Debug)]
#[command(name = "storyboard", version, about)]
struct Args {
    /// Scene prompts used to generate storyboard frames
    #[arg(long, num_args = 1.., default_values_t = [
        "A cat waking up in a sunny room".to_string(),
        "The cat stretches and yawns".to_string(),
        "The cat walks to the window".to_string(),
        "The cat looks outside at birds flying".to_string(),
    ])]
    prompts: Vec<String>,

    /// Model id to invoke (default from DEFAULT_MODEL_ID)
    #[arg(long)]
    model_id: Option<String>,

    /// Directory for downloaded media (default from OUTPUT_DIR)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Service region (default from AWS_REGION)
    #[arg(long)]
    region: Option<String>,

    /// Use the images in this directory instead of generating frames
    #[arg(long)]
    storyboard_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        error!("storyboard generation failed: {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> nova_video::Result<()> {
    let mut config = Config::from_env();
    if let Some(region) = args.region {
        config.region = region;
    }
    if let Some(model_id) = args.model_id {
        config.model_id = model_id;
    }
    if let Some(output_dir) = args.output_dir {
        config.output_dir = output_dir;
    }

    tokio::fs::create_dir_all(&config.output_dir).await?;

    let client = Client::from_config(&config)?;

    let image_paths = match &args.storyboard_dir {
        Some(dir) => {
            info!("using existing storyboard images from {}", dir.display());
            let paths = image_files_in_dir(dir)?;
            if paths.is_empty() {
                return Err(VideoGenError::Validation {
                    code: "ValidationException".to_string(),
                    message: format!("no image files found in {}", dir.display()),
                });
            }
            paths
        }
        None => generate_frames(&client, &args.prompts, &config.output_dir).await?,
    };

    info!(
        "generating video from {} storyboard image(s)",
        image_paths.len()
    );
    let mut frames = Vec::with_capacity(image_paths.len());
    for path in &image_paths {
        frames.push(StoryboardFrame::from_file(path).await?);
    }

    let request = GenerationRequest::storyboard(frames).image_quality(&config.image_quality);
    let job_id = client.submit(&config.model_id, &request).await?;

    info!("waiting for job {job_id} to complete");
    let opts = PollOptions {
        on_status: Some(Box::new(|status| info!("job status: {status}"))),
        ..PollOptions::default()
    };
    let report = client
        .wait_for_completion(&config.model_id, &job_id, TaskType::ImageToVideo, &opts)
        .await?;

    match report.video_url() {
        Some(url) => {
            let dest = video_path(&config.output_dir, &job_id);
            client.download(url, &dest).await?;
            info!("video saved to {}", dest.display());
        }
        None => warn!("completed job returned no video url"),
    }

    if let Some(url) = report.thumbnail_url() {
        let dest = thumbnail_path(&config.output_dir, &job_id);
        client.download(url, &dest).await?;
        info!("thumbnail saved to {}", dest.display());
    }

    info!("storyboard video generation finished");
    Ok(())
}

/// Generate one frame per prompt, strictly in order, pacing requests with a
/// fixed delay rather than any backpressure signal from the service.
async fn generate_frames(
    client: &Client,
    prompts: &[String],
    output_dir: &std::path::Path,
) -> nova_video::Result<Vec<PathBuf>> {
    let mut paths = Vec::with_capacity(prompts.len());

    for (i, prompt) in prompts.iter().enumerate() {
        info!(
            "generating storyboard image {}/{}: '{prompt}'",
            i + 1,
            prompts.len()
        );
        let bytes = client
            .generate_storyboard_image(prompt, rand::random())
            .await?;

        let dest = storyboard_frame_path(output_dir, i + 1);
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&dest, &bytes).await?;
        info!("storyboard image saved to {}", dest.display());
        paths.push(dest);

        if i + 1 < prompts.len() {
            tokio::time::sleep(IMAGE_REQUEST_DELAY).await;
        }
    }

    Ok(paths)
}
