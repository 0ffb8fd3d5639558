//! Mock HTTP integration tests for the video generation client.
//!
//! Covers request formatting, error classification over the wire, the
//! polling loop's exit conditions, artifact downloads, and the full
//! submit/poll/download flow against a wiremock server.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use nova_video::{
    video_path, Client, ClientBuilder, GenerationRequest, JobStatus, PollOptions, TaskType,
    TimeoutReason, VideoGenError,
};

const MODEL_ID: &str = "amazon.nova.video-1080p";

fn invoke_path() -> String {
    format!("/model/{MODEL_ID}/invoke")
}

fn test_client(server: &MockServer) -> Client {
    ClientBuilder::new()
        .credentials("AKIA_TEST", "test-secret")
        .endpoint(server.uri())
        .build()
        .unwrap()
}

fn fast_poll(max_attempts: u32) -> PollOptions {
    PollOptions {
        interval: Duration::ZERO,
        max_attempts,
        timeout: Duration::from_secs(30),
        on_status: None,
    }
}

// === Submission ===

#[tokio::test]
async fn submit_sends_envelope_and_returns_job_id() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(invoke_path()))
        .and(header("content-type", "application/json"))
        .and(header("accept", "application/json"))
        .and(header_exists("authorization"))
        .and(body_partial_json(json!({
            "prompt": "A sailboat at dawn",
            "duration": 5000,
            "aspectRatio": "16:9",
            "jobType": "video-generation",
            "taskType": "text-to-video",
            "imageQuality": "premium",
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"jobId": "job-42", "status": "submitted"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let request = GenerationRequest::text("A sailboat at dawn")
        .duration_ms(5000)
        .image_quality("premium");

    let job_id = client.submit(MODEL_ID, &request).await.unwrap();
    assert_eq!(job_id, "job-42");
}

#[tokio::test]
async fn submit_without_job_id_fails_before_any_polling() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(invoke_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "submitted"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let request = GenerationRequest::text("a prompt");

    let result = client.submit(MODEL_ID, &request).await;
    assert!(matches!(result, Err(VideoGenError::MissingJobId)));
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn submit_rejects_empty_prompt_without_calling_the_service() {
    let mock_server = MockServer::start().await;

    let client = test_client(&mock_server);
    let request = GenerationRequest::text("   ");

    let result = client.submit(MODEL_ID, &request).await;
    assert!(matches!(result, Err(VideoGenError::Validation { .. })));
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

// === Error classification over the wire ===

async fn submit_against_error_body(status: u16, body: serde_json::Value) -> VideoGenError {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(invoke_path()))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    client
        .submit(MODEL_ID, &GenerationRequest::text("a prompt"))
        .await
        .unwrap_err()
}

#[tokio::test]
async fn access_denied_response_is_classified() {
    let err = submit_against_error_body(
        403,
        json!({"__type": "AccessDeniedException", "message": "not allowed"}),
    )
    .await;

    match err {
        VideoGenError::AccessDenied { code, message } => {
            assert_eq!(code, "AccessDeniedException");
            assert_eq!(message, "not allowed");
        }
        other => panic!("expected AccessDenied, got {other:?}"),
    }
}

#[tokio::test]
async fn throttling_response_is_classified() {
    let err = submit_against_error_body(
        429,
        json!({"code": "ThrottlingException", "message": "slow down"}),
    )
    .await;
    assert!(matches!(err, VideoGenError::Throttled { .. }));
}

#[tokio::test]
async fn quota_exceeded_response_is_classified() {
    let err = submit_against_error_body(
        400,
        json!({"code": "ServiceQuotaExceededException", "message": "over quota"}),
    )
    .await;
    assert!(matches!(err, VideoGenError::QuotaExceeded { .. }));
}

#[tokio::test]
async fn unrecognized_code_becomes_generic_service_error() {
    let err = submit_against_error_body(
        500,
        json!({"code": "BrandNewException", "message": "who knows"}),
    )
    .await;

    match err {
        VideoGenError::Service { code, message } => {
            assert_eq!(code, "BrandNewException");
            assert_eq!(message, "who knows");
        }
        other => panic!("expected Service, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_success_body_is_a_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(invoke_path()))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let result = client
        .submit(MODEL_ID, &GenerationRequest::text("a prompt"))
        .await;
    assert!(matches!(result, Err(VideoGenError::Decode { .. })));
}

// === Polling ===

#[tokio::test]
async fn poller_returns_after_running_running_completed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(invoke_path()))
        .and(body_partial_json(json!({"jobId": "job-42"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "running"})))
        .up_to_n_times(2)
        .with_priority(1)
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(invoke_path()))
        .and(body_partial_json(json!({"jobId": "job-42"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jobId": "job-42",
            "status": "completed",
            "videos": [{"url": "http://x/video.mp4"}],
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let observed = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&observed);
    let opts = PollOptions {
        on_status: Some(Box::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })),
        ..fast_poll(10)
    };

    let report = client
        .wait_for_completion(MODEL_ID, "job-42", TaskType::TextToVideo, &opts)
        .await
        .unwrap();

    assert_eq!(report.status, JobStatus::Completed);
    assert_eq!(report.video_url(), Some("http://x/video.mp4"));
    // exactly three status queries
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 3);
    assert_eq!(observed.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn poller_fails_immediately_on_failed_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(invoke_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "failed",
            "errorMessage": "GPU quota exhausted",
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let result = client
        .wait_for_completion(MODEL_ID, "job-42", TaskType::TextToVideo, &fast_poll(10))
        .await;

    match result {
        Err(VideoGenError::JobTerminated {
            job_id,
            status,
            message,
        }) => {
            assert_eq!(job_id, "job-42");
            assert_eq!(status, JobStatus::Failed);
            assert_eq!(message, "GPU quota exhausted");
        }
        other => panic!("expected JobTerminated, got {other:?}"),
    }
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn poller_fails_immediately_on_expired_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(invoke_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "expired"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let result = client
        .wait_for_completion(MODEL_ID, "job-42", TaskType::TextToVideo, &fast_poll(10))
        .await;

    assert!(matches!(
        result,
        Err(VideoGenError::JobTerminated {
            status: JobStatus::Expired,
            ..
        })
    ));
}

#[tokio::test]
async fn poller_exhausts_attempt_budget() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(invoke_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "running"})))
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let result = client
        .wait_for_completion(MODEL_ID, "job-42", TaskType::TextToVideo, &fast_poll(3))
        .await;

    match result {
        Err(VideoGenError::JobTimeout { job_id, reason }) => {
            assert_eq!(job_id, "job-42");
            assert_eq!(reason, TimeoutReason::Attempts { attempts: 3 });
        }
        other => panic!("expected JobTimeout, got {other:?}"),
    }
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn poller_exhausts_wall_clock_budget_without_querying() {
    let mock_server = MockServer::start().await;

    let client = test_client(&mock_server);
    let opts = PollOptions {
        interval: Duration::ZERO,
        max_attempts: 100,
        timeout: Duration::ZERO,
        on_status: None,
    };
    let result = client
        .wait_for_completion(MODEL_ID, "job-42", TaskType::TextToVideo, &opts)
        .await;

    assert!(matches!(
        result,
        Err(VideoGenError::JobTimeout {
            reason: TimeoutReason::WallClock { .. },
            ..
        })
    ));
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn poller_retries_after_a_transient_transport_error() {
    let mock_server = MockServer::start().await;

    // First status check stalls past the client timeout, producing a
    // transport error rather than a terminal job state.
    Mock::given(method("POST"))
        .and(path(invoke_path()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "running"}))
                .set_delay(Duration::from_secs(5)),
        )
        .up_to_n_times(1)
        .with_priority(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(invoke_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "completed",
            "videos": [{"url": "http://x/video.mp4"}],
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ClientBuilder::new()
        .credentials("AKIA_TEST", "test-secret")
        .endpoint(mock_server.uri())
        .timeout(Duration::from_millis(250))
        .build()
        .unwrap();

    let report = client
        .wait_for_completion(MODEL_ID, "job-42", TaskType::TextToVideo, &fast_poll(5))
        .await
        .unwrap();

    assert_eq!(report.status, JobStatus::Completed);
}

#[tokio::test]
async fn poller_aborts_on_classified_service_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(invoke_path()))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(json!({"code": "AccessDeniedException", "message": "no"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let result = client
        .wait_for_completion(MODEL_ID, "job-42", TaskType::TextToVideo, &fast_poll(10))
        .await;

    assert!(matches!(result, Err(VideoGenError::AccessDenied { .. })));
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);
}

// === Downloads ===

#[tokio::test]
async fn download_streams_body_and_creates_parent_dirs() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/artifacts/video.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"MOCK_MP4_BYTES".to_vec()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("nested").join("out").join("video.mp4");

    let client = test_client(&mock_server);
    let url = format!("{}/artifacts/video.mp4", mock_server.uri());
    let written = client.download(&url, &dest).await.unwrap();

    assert_eq!(written, dest);
    assert_eq!(std::fs::read(&dest).unwrap(), b"MOCK_MP4_BYTES");
}

#[tokio::test]
async fn failed_download_creates_no_file() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/artifacts/video.mp4"))
        .respond_with(ResponseTemplate::new(404).set_body_string("gone"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("video.mp4");

    let client = test_client(&mock_server);
    let url = format!("{}/artifacts/video.mp4", mock_server.uri());
    let result = client.download(&url, &dest).await;

    match result {
        Err(VideoGenError::Download { status, message }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "gone");
        }
        other => panic!("expected Download error, got {other:?}"),
    }
    assert!(!dest.exists());
}

// === Storyboard image generation ===

#[tokio::test]
async fn storyboard_image_generation_decodes_first_artifact() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/model/stability.stable-diffusion-xl-v1/invoke"))
        .and(body_partial_json(json!({
            "text_prompts": [{"text": "a cat by the window"}],
            "cfg_scale": 7,
            "steps": 30,
            "width": 1024,
            "height": 576,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            // base64 of "PNGDATA"
            "artifacts": [{"base64": "UE5HREFUQQ=="}],
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let bytes = client
        .generate_storyboard_image("a cat by the window", 7)
        .await
        .unwrap();
    assert_eq!(bytes, b"PNGDATA");
}

#[tokio::test]
async fn storyboard_image_response_without_artifacts_is_a_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/model/stability.stable-diffusion-xl-v1/invoke"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"artifacts": []})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let result = client.generate_storyboard_image("a cat", 7).await;
    assert!(matches!(result, Err(VideoGenError::Decode { .. })));
}

// === End to end ===

#[tokio::test]
async fn full_flow_submits_polls_and_downloads_the_video() {
    let mock_server = MockServer::start().await;

    // Submission.
    Mock::given(method("POST"))
        .and(path(invoke_path()))
        .and(body_partial_json(json!({
            "prompt": "A cat playing with a ball",
            "taskType": "text-to-video",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"jobId": "abc123"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Two running polls, then completed with a video url.
    Mock::given(method("POST"))
        .and(path(invoke_path()))
        .and(body_partial_json(json!({"jobId": "abc123"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "running"})))
        .up_to_n_times(2)
        .with_priority(1)
        .expect(2)
        .mount(&mock_server)
        .await;

    let video_url = format!("{}/artifacts/abc123.mp4", mock_server.uri());
    Mock::given(method("POST"))
        .and(path(invoke_path()))
        .and(body_partial_json(json!({"jobId": "abc123"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jobId": "abc123",
            "status": "completed",
            "videos": [{"url": video_url}],
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/artifacts/abc123.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"GENERATED_VIDEO".to_vec()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let output_root = tempfile::tempdir().unwrap();
    let output_dir = output_root.path().join("output");

    let client = test_client(&mock_server);
    let request = GenerationRequest::text("A cat playing with a ball");
    let job_id = client.submit(MODEL_ID, &request).await.unwrap();
    assert_eq!(job_id, "abc123");

    let report = client
        .wait_for_completion(MODEL_ID, &job_id, TaskType::TextToVideo, &fast_poll(10))
        .await
        .unwrap();

    let url = report.video_url().unwrap();
    let dest = video_path(&output_dir, &job_id);
    client.download(url, &dest).await.unwrap();

    assert_eq!(dest, output_dir.join("video_abc123.mp4"));
    assert_eq!(std::fs::read(&dest).unwrap(), b"GENERATED_VIDEO");
}
