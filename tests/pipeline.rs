use httpmock::prelude::*;
use mod_translator_client::{
    BatchProcessor, ClientConfig, OutputDirs, RetryPolicy, SubmissionParams, TransportSession,
    TranslatorClientError,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::time::Duration;
use tempfile::TempDir;
use url::Url;

fn no_backoff() -> RetryPolicy {
    RetryPolicy {
        backoff_factor: 0.0,
        ..RetryPolicy::default()
    }
}

/// One temp workspace per test: an input directory plus the three outcome
/// directories, wired to a processor pointed at `base_url`.
struct Harness {
    root: TempDir,
    processor: BatchProcessor,
}

impl Harness {
    fn new(base_url: &str) -> Self {
        Self::with_concurrency(base_url, ClientConfig::default().concurrency)
    }

    fn with_concurrency(base_url: &str, concurrency: usize) -> Self {
        Self::build(base_url, concurrency, Duration::from_secs(5))
    }

    fn with_request_timeout(base_url: &str, timeout: Duration) -> Self {
        Self::build(base_url, ClientConfig::default().concurrency, timeout)
    }

    fn build(base_url: &str, concurrency: usize, timeout: Duration) -> Self {
        let root = tempfile::tempdir().expect("tempdir");
        let dirs = OutputDirs {
            output: root.path().join("translated"),
            invalid: root.path().join("invalid"),
            corrupted: root.path().join("corrupted"),
        };
        let url: Url = format!("{base_url}/process").parse().expect("url");
        let session = TransportSession::new(url, no_backoff(), timeout).expect("session");
        let config = ClientConfig {
            concurrency,
            ..ClientConfig::default()
        };
        let processor =
            BatchProcessor::new(session, dirs, config).with_skip_health_check(true);
        Self { root, processor }
    }

    fn write_archive(&self, name: &str, len: usize) -> PathBuf {
        let input = self.root.path().join("input");
        std::fs::create_dir_all(&input).expect("input dir");
        let path = input.join(name);
        std::fs::write(&path, vec![0x4a; len]).expect("write archive");
        path
    }

    fn output_file(&self, name: &str) -> PathBuf {
        self.root.path().join("translated").join(name)
    }

    fn invalid_file(&self, name: &str) -> PathBuf {
        self.root.path().join("invalid").join(name)
    }

    fn corrupted_file(&self, name: &str) -> PathBuf {
        self.root.path().join("corrupted").join(name)
    }
}

fn exists(path: &Path) -> bool {
    path.exists()
}

#[tokio::test]
async fn successful_upload_saves_output_and_removes_original() {
    let server = MockServer::start_async().await;
    let mock = server.mock(|when, then| {
        when.method(POST).path("/process");
        then.status(200).body(vec![0x50u8; 512]);
    });

    let harness = Harness::new(&server.base_url());
    let archive = harness.write_archive("simple-mod.jar", 2048);

    let stats = harness
        .processor
        .process_files(vec![archive.clone()], &SubmissionParams::default())
        .await
        .expect("batch should succeed");

    mock.assert();
    assert_eq!(stats.success, 1);
    assert_eq!(stats.total(), 1);
    assert_eq!(stats.provider_usage.get("openrouter"), Some(&1));

    let output = harness.output_file("simple-mod.jar");
    assert!(exists(&output), "translated output should exist");
    assert_eq!(std::fs::metadata(&output).unwrap().len(), 512);
    assert!(!exists(&archive), "original should be deleted after success");
}

#[tokio::test]
async fn corrupted_archive_message_moves_file_to_corrupted_dir() {
    let server = MockServer::start_async().await;
    let mock = server.mock(|when, then| {
        when.method(POST).path("/process");
        then.status(400)
            .json_body(serde_json::json!({"error": "corrupted archive, not a zip"}));
    });

    let harness = Harness::new(&server.base_url());
    let archive = harness.write_archive("broken.jar", 256);

    let stats = harness
        .processor
        .process_files(vec![archive.clone()], &SubmissionParams::default())
        .await
        .expect("batch completes despite per-file failure");

    mock.assert();
    assert_eq!(stats.corrupted, 1);
    assert_eq!(stats.success, 0);
    assert!(!exists(&archive), "original should have been moved away");
    assert!(exists(&harness.corrupted_file("broken.jar")));
}

#[tokio::test]
async fn corruption_keyword_wins_over_retried_server_error() {
    let server = MockServer::start_async().await;
    let mock = server.mock(|when, then| {
        when.method(POST).path("/process");
        then.status(500)
            .json_body(serde_json::json!({"error": "corrupted archive, not a zip"}));
    });

    let harness = Harness::new(&server.base_url());
    let archive = harness.write_archive("half-written.jar", 256);

    let stats = harness
        .processor
        .process_files(vec![archive.clone()], &SubmissionParams::default())
        .await
        .expect("batch completes");

    mock.assert_hits(3);
    assert_eq!(stats.corrupted, 1);
    assert_eq!(stats.retry_exceeded, 0);
    assert!(exists(&harness.corrupted_file("half-written.jar")));
}

#[tokio::test]
async fn missing_structure_message_moves_file_to_invalid_dir() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(POST).path("/process");
        then.status(400)
            .json_body(serde_json::json!({"error": "no lang folder found in archive"}));
    });

    let harness = Harness::new(&server.base_url());
    let archive = harness.write_archive("textures-only.jar", 256);

    let stats = harness
        .processor
        .process_files(vec![archive.clone()], &SubmissionParams::default())
        .await
        .expect("batch completes");

    assert_eq!(stats.invalid_structure, 1);
    assert!(!exists(&archive));
    assert!(exists(&harness.invalid_file("textures-only.jar")));
}

#[tokio::test]
async fn implausibly_small_response_is_an_application_error() {
    let server = MockServer::start_async().await;
    let mock = server.mock(|when, then| {
        when.method(POST).path("/process");
        then.status(200).body(vec![0x50u8; 40]);
    });

    let harness = Harness::new(&server.base_url());
    let archive = harness.write_archive("tiny-reply.jar", 256);

    let stats = harness
        .processor
        .process_files(vec![archive.clone()], &SubmissionParams::default())
        .await
        .expect("batch completes");

    mock.assert();
    assert_eq!(stats.application_error, 1);
    assert_eq!(stats.success, 0);
    assert!(exists(&archive), "original stays put on implausible response");
    assert!(!exists(&harness.output_file("tiny-reply.jar")));
}

#[tokio::test]
async fn unavailable_service_aborts_before_any_upload() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(GET).path("/health");
        then.status(503);
    });
    let upload = server.mock(|when, then| {
        when.method(POST).path("/process");
        then.status(200).body(vec![0x50u8; 512]);
    });

    let harness = Harness::new(&server.base_url());
    let processor = harness.processor.clone().with_skip_health_check(false);
    let archive = harness.write_archive("queued.jar", 256);

    let err = processor
        .process_files(vec![archive.clone()], &SubmissionParams::default())
        .await
        .expect_err("unavailable service must abort the batch");

    assert!(matches!(err, TranslatorClientError::ServerUnavailable { .. }));
    upload.assert_hits(0);
    assert!(exists(&archive), "nothing should be uploaded or moved");
    assert_eq!(processor.stats().snapshot().total(), 0);
}

#[tokio::test]
async fn missing_health_endpoint_does_not_block_the_batch() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(GET).path("/health");
        then.status(404);
    });
    server.mock(|when, then| {
        when.method(POST).path("/process");
        then.status(200).body(vec![0x50u8; 512]);
    });

    let harness = Harness::new(&server.base_url());
    let processor = harness.processor.clone().with_skip_health_check(false);
    let archive = harness.write_archive("optimistic.jar", 256);

    let stats = processor
        .process_files(vec![archive], &SubmissionParams::default())
        .await
        .expect("unverified health proceeds");

    assert_eq!(stats.success, 1);
}

#[tokio::test]
async fn dry_run_touches_nothing() {
    let server = MockServer::start_async().await;
    let mock = server.mock(|when, then| {
        when.method(POST).path("/process");
        then.status(200).body(vec![0x50u8; 512]);
    });

    let harness = Harness::new(&server.base_url());
    let processor = harness.processor.clone().with_dry_run(true);
    let archive = harness.write_archive("untouched.jar", 256);

    let stats = processor
        .process_files(vec![archive.clone()], &SubmissionParams::default())
        .await
        .expect("dry run succeeds");

    mock.assert_hits(0);
    assert_eq!(stats.total(), 0);
    assert!(exists(&archive));
    assert!(!exists(&harness.output_file("untouched.jar")));
}

#[tokio::test]
async fn invalid_candidates_never_reach_the_network() {
    let server = MockServer::start_async().await;
    let mock = server.mock(|when, then| {
        when.method(POST).path("/process");
        then.status(200).body(vec![0x50u8; 512]);
    });

    let harness = Harness::new(&server.base_url());
    let empty = harness.write_archive("empty.jar", 0);
    let wrong_ext = harness.write_archive("notes.txt", 64);
    let missing = harness.root.path().join("input").join("ghost.jar");

    let stats = harness
        .processor
        .process_files(
            vec![empty.clone(), wrong_ext.clone(), missing],
            &SubmissionParams::default(),
        )
        .await
        .expect("batch completes");

    mock.assert_hits(0);
    assert_eq!(stats.skipped, 3);
    assert!(exists(&empty), "rejected files stay in place");
    assert!(exists(&wrong_ext));
}

#[tokio::test]
async fn slow_server_counts_as_timeout_and_leaves_file() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(POST).path("/process");
        then.delay(Duration::from_secs(3))
            .status(200)
            .body(vec![0x50u8; 512]);
    });

    let harness = Harness::with_request_timeout(&server.base_url(), Duration::from_millis(500));
    let archive = harness.write_archive("slowpoke.jar", 256);

    let stats = harness
        .processor
        .process_files(vec![archive.clone()], &SubmissionParams::default())
        .await
        .expect("batch completes");

    assert_eq!(stats.timeout, 1);
    assert_eq!(stats.success, 0);
    assert!(exists(&archive), "timed-out files stay in place for a future run");
    assert!(!exists(&harness.output_file("slowpoke.jar")));
}

#[tokio::test]
async fn stop_flag_set_before_start_skips_every_task() {
    let server = MockServer::start_async().await;
    let mock = server.mock(|when, then| {
        when.method(POST).path("/process");
        then.status(200).body(vec![0x50u8; 512]);
    });

    let harness = Harness::new(&server.base_url());
    let archives: Vec<_> = (0..3)
        .map(|i| harness.write_archive(&format!("mod-{i}.jar"), 128))
        .collect();

    harness
        .processor
        .stop_flag()
        .store(true, Ordering::Relaxed);

    let stats = harness
        .processor
        .process_files(archives.clone(), &SubmissionParams::default())
        .await
        .expect("batch completes");

    mock.assert_hits(0);
    assert_eq!(stats.total(), 0);
    for archive in &archives {
        assert!(exists(archive), "skipped tasks must not touch their files");
    }
}

#[tokio::test]
async fn unreachable_server_counts_as_connection_error() {
    let harness = Harness::new("http://127.0.0.1:9");
    let archive = harness.write_archive("stranded.jar", 256);

    let stats = harness
        .processor
        .process_files(vec![archive.clone()], &SubmissionParams::default())
        .await
        .expect("batch completes");

    assert_eq!(stats.connection_error, 1);
    assert!(exists(&archive), "transport failures leave the file in place");
}

#[tokio::test]
async fn batch_counts_are_stable_across_concurrency_levels() {
    for concurrency in [1usize, 4] {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/process");
            then.status(200).body(vec![0x50u8; 512]);
        });

        let harness = Harness::with_concurrency(&server.base_url(), concurrency);
        let files: Vec<_> = (0..6)
            .map(|i| harness.write_archive(&format!("mod-{i}.jar"), 128))
            .collect();

        let stats = harness
            .processor
            .process_files(files, &SubmissionParams::default())
            .await
            .expect("batch completes");

        assert_eq!(stats.success, 6, "concurrency {concurrency}");
        assert_eq!(stats.total(), 6, "concurrency {concurrency}");
    }
}

#[tokio::test]
async fn empty_batch_is_a_no_op() {
    let harness = Harness::new("http://127.0.0.1:9");
    let stats = harness
        .processor
        .process_files(Vec::new(), &SubmissionParams::default())
        .await
        .expect("empty batch succeeds");
    assert_eq!(stats.total(), 0);
}
