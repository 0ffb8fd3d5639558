//! Text-to-video generation example.
//!
//! Submits a prompt, waits for the job to complete, and downloads the video
//! (and thumbnail, when present) into the output directory.
//!
//! ```text
//! AWS_ACCESS_KEY_ID=... AWS_SECRET_ACCESS_KEY=... \
//!     cargo run --bin generate -- --prompt "A sailboat at dawn"
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info, warn};

use nova_video::{
    thumbnail_path, video_path, Client, Config, GenerationRequest, PollOptions, TaskType,
};

/// Generate a video from a text prompt.
#[derive(Parser, Debug)]
#[command(name = "generate", version, about)]
struct Args {
    /// Prompt describing the video to generate
    #[arg(long, default_value = "A cat playing with a ball in a sunny garden")]
    prompt: String,

    /// Model id to invoke (default from DEFAULT_MODEL_ID)
    #[arg(long)]
    model_id: Option<String>,

    /// Video duration in milliseconds (default from DEFAULT_DURATION)
    #[arg(long)]
    duration: Option<u64>,

    /// Directory for downloaded media (default from OUTPUT_DIR)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Service region (default from AWS_REGION)
    #[arg(long)]
    region: Option<String>,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        error!("video generation failed: {e}");
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
    if let Some(duration) = args.duration {
        config.duration_ms = duration;
    }
    if let Some(output_dir) = args.output_dir {
        config.output_dir = output_dir;
    }

    tokio::fs::create_dir_all(&config.output_dir).await?;

    let client = Client::from_config(&config)?;

    info!("starting video generation: '{}'", args.prompt);
    let request = GenerationRequest::text(&args.prompt)
        .duration_ms(config.duration_ms)
        .image_quality(&config.image_quality);
    let job_id = client.submit(&config.model_id, &request).await?;

    info!("waiting for job {job_id} to complete");
    let opts = PollOptions {
        on_status: Some(Box::new(|status| info!("job status: {status}"))),
        ..PollOptions::default()
    };
    let report = client
        .wait_for_completion(&config.model_id, &job_id, TaskType::TextToVideo, &opts)
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

    info!("video generation finished");
    Ok(())
}
