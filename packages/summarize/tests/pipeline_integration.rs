//! End-to-end pipeline tests with mock backends and acquirers.
//!
//! Covers ordering, the scheduler ceiling, the backend permit pool,
//! directory folding, retries and timeouts.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use summarize::{
    acquirers::{FileAcquirer, ImageAcquirer},
    testing::{MockAcquirer, MockBackend, MockBackendFailure},
    AcquiredContent, AcquisitionError, AcquisitionErrorKind, Acquirer, Acquirers, DirectoryConfig,
    FailureCategory, Locator, LocatorKind, Outcome, Pipeline, PipelineConfig, RetryPolicy,
    SummaryBackend, SummaryBackendExt, SummaryResult,
};

fn config(concurrency: usize) -> PipelineConfig {
    PipelineConfig::new()
        .with_concurrency(concurrency)
        .with_retry(RetryPolicy::immediate(3))
}

fn pipeline_with(
    backend: Arc<dyn SummaryBackend>,
    acquirer: Arc<MockAcquirer>,
    config: PipelineConfig,
) -> Pipeline {
    Pipeline::new(backend, Acquirers::uniform(acquirer), config).unwrap()
}

/// Real file and image acquisition for directory trees.
fn local_acquirers() -> Acquirers {
    Acquirers::uniform(Arc::new(FileAcquirer)).with_image(Arc::new(ImageAcquirer))
}

fn summary(result: &SummaryResult) -> &str {
    result
        .summary()
        .unwrap_or_else(|| panic!("{} failed: {:?}", result.locator, result.failure()))
}

/// 2x3 PNG header.
fn tiny_png() -> Vec<u8> {
    let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
    bytes.extend_from_slice(&13u32.to_be_bytes());
    bytes.extend_from_slice(b"IHDR");
    bytes.extend_from_slice(&2u32.to_be_bytes());
    bytes.extend_from_slice(&3u32.to_be_bytes());
    bytes.extend_from_slice(&[8, 2, 0, 0, 0]);
    bytes
}

#[tokio::test]
async fn test_every_input_yields_one_result_in_order() {
    let acquirer = Arc::new(
        MockAcquirer::new()
            .with_text("https://example.com/a", "page a")
            .fail("missing.txt", AcquisitionErrorKind::NotFound),
    );
    let pipeline = pipeline_with(Arc::new(MockBackend::new()), acquirer, config(4));

    let refs = ["https://example.com/a", "missing.txt", "notes.txt", "https://wiki.example.com/browse/X-1"];
    let results = pipeline.run(refs).await;

    assert_eq!(results.len(), refs.len());
    for (result, raw) in results.iter().zip(refs) {
        assert_eq!(result.locator.raw(), raw);
    }
    assert_eq!(summary(&results[0]), "summary of page a");
    assert_eq!(summary(&results[2]), "summary of content of notes.txt");

    let failure = results[1].failure().unwrap();
    assert_eq!(failure.category, FailureCategory::NotFound);
    assert_eq!(failure.attempts, 1);
    assert_eq!(results[3].locator.kind(), LocatorKind::WikiOrTicket);
}

#[tokio::test]
async fn test_empty_input_yields_no_results() {
    let pipeline = pipeline_with(Arc::new(MockBackend::new()), Arc::new(MockAcquirer::new()), config(2));
    assert!(pipeline.run(Vec::<String>::new()).await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_scheduler_ceiling_holds_for_any_k() {
    for k in [1, 2, 5, 10] {
        let acquirer = Arc::new(MockAcquirer::new().with_delay(Duration::from_millis(25)));
        let pipeline = pipeline_with(Arc::new(MockBackend::new()), acquirer.clone(), config(k));

        let refs: Vec<String> = (0..24).map(|i| format!("doc-{}.txt", i)).collect();
        let results = pipeline.run(&refs).await;

        assert_eq!(results.len(), 24);
        assert!(results.iter().all(|r| r.is_success()));
        assert_eq!(pipeline.scheduler().peak(), k.min(24));
        assert!(acquirer.peak_concurrency() <= k);
    }
}

#[tokio::test(start_paused = true)]
async fn test_backend_pool_nested_inside_scheduler() {
    let mock = Arc::new(MockBackend::new().with_delay(Duration::from_millis(40)));
    let backend: Arc<dyn SummaryBackend> = Arc::new(mock.clone().with_permits(2));
    let acquirer = Arc::new(MockAcquirer::new().with_delay(Duration::from_millis(5)));
    let pipeline = pipeline_with(backend, acquirer, config(5));

    let refs: Vec<String> = (0..20).map(|i| format!("https://example.com/{}", i)).collect();
    let results = pipeline.run(&refs).await;

    assert_eq!(results.len(), 20);
    assert!(results.iter().all(|r| r.is_success()));
    assert_eq!(mock.call_count(), 20);
    assert!(mock.peak_concurrency() <= 2, "backend peak {}", mock.peak_concurrency());
    assert_eq!(mock.peak_concurrency(), 2);
    assert!(pipeline.scheduler().peak() <= 5, "scheduler peak {}", pipeline.scheduler().peak());
}

#[tokio::test]
async fn test_directory_folds_successful_children() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.txt"), "alpha").unwrap();
    std::fs::write(dir.path().join("b.txt"), "bravo").unwrap();
    std::fs::write(dir.path().join("c.txt"), "charlie").unwrap();

    let backend = MockBackend::new().fail_always("bravo", MockBackendFailure::Malformed);
    let pipeline = Pipeline::new(Arc::new(backend), local_acquirers(), config(4)).unwrap();

    let results = pipeline.run([dir.path().to_str().unwrap()]).await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].locator.kind(), LocatorKind::Directory);
    assert_eq!(summary(&results[0]), "summary of alpha\nsummary of charlie");
}

#[tokio::test]
async fn test_directory_skips_children_that_cannot_be_acquired() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.txt"), "alpha").unwrap();
    std::fs::write(dir.path().join("b.png"), "not really a png").unwrap();
    std::fs::write(dir.path().join("c.txt"), "charlie").unwrap();

    let pipeline = Pipeline::new(Arc::new(MockBackend::new()), local_acquirers(), config(4)).unwrap();
    let results = pipeline.run([dir.path().to_str().unwrap()]).await;

    assert_eq!(results.len(), 1);
    assert_eq!(summary(&results[0]), "summary of alpha\nsummary of charlie");
}

// Linux filesystems accept arbitrary bytes in names; others may not.
#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_directory_reads_non_utf8_names() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(OsStr::from_bytes(b"caf\xe9.txt")), "readable content").unwrap();
    std::fs::write(dir.path().join("z.txt"), "zulu").unwrap();

    let pipeline = Pipeline::new(Arc::new(MockBackend::new()), local_acquirers(), config(2)).unwrap();
    let results = pipeline.run([dir.path().to_str().unwrap()]).await;

    assert_eq!(summary(&results[0]), "summary of readable content\nsummary of zulu");
}

#[tokio::test]
async fn test_directory_children_share_a_single_slot() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("nested")).unwrap();
    std::fs::write(dir.path().join("nested/one.txt"), "one").unwrap();
    std::fs::write(dir.path().join("two.txt"), "two").unwrap();
    std::fs::write(dir.path().join("pic.png"), tiny_png()).unwrap();
    let loose = dir.path().join("two.txt");

    let pipeline = Pipeline::new(Arc::new(MockBackend::new()), local_acquirers(), config(1)).unwrap();
    let results = pipeline
        .run([dir.path().to_str().unwrap(), loose.to_str().unwrap()])
        .await;

    assert_eq!(
        summary(&results[0]),
        "summary of one\nimage 2x3\nsummary of two"
    );
    assert_eq!(summary(&results[1]), "summary of two");
    assert_eq!(pipeline.scheduler().peak(), 1);
}

#[tokio::test]
async fn test_directory_resummarize() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.txt"), "alpha").unwrap();
    std::fs::write(dir.path().join("b.txt"), "bravo").unwrap();

    let config = config(3).with_directory(DirectoryConfig {
        resummarize: true,
        ..DirectoryConfig::default()
    });
    let pipeline = Pipeline::new(Arc::new(MockBackend::new()), local_acquirers(), config).unwrap();

    let results = pipeline.run([dir.path().to_str().unwrap()]).await;
    assert_eq!(
        summary(&results[0]),
        "summary of summary of alpha\nsummary of bravo"
    );
}

#[tokio::test]
async fn test_empty_directory_succeeds_with_empty_summary() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::new(Arc::new(MockBackend::new()), local_acquirers(), config(2)).unwrap();

    let results = pipeline.run([dir.path().to_str().unwrap()]).await;
    assert_eq!(results[0].outcome, Outcome::Summary(String::new()));
}

#[tokio::test]
async fn test_transient_failures_retry_up_to_max_attempts() {
    let acquirer = Arc::new(
        MockAcquirer::new()
            .fail_times("recovers.txt", 2, AcquisitionErrorKind::Network)
            .fail_times("gives-up.txt", 5, AcquisitionErrorKind::Network)
            .fail_times("permanent.txt", 5, AcquisitionErrorKind::Unauthorized),
    );
    let pipeline = pipeline_with(Arc::new(MockBackend::new()), acquirer.clone(), config(3));

    let results = pipeline
        .run(["recovers.txt", "gives-up.txt", "permanent.txt"])
        .await;

    assert!(results[0].is_success());
    assert_eq!(acquirer.attempts("recovers.txt"), 3);

    let gave_up = results[1].failure().unwrap();
    assert_eq!((gave_up.category, gave_up.attempts), (FailureCategory::Network, 3));
    assert_eq!(acquirer.attempts("gives-up.txt"), 3);

    let permanent = results[2].failure().unwrap();
    assert_eq!((permanent.category, permanent.attempts), (FailureCategory::Unauthorized, 1));
    assert_eq!(acquirer.attempts("permanent.txt"), 1);
}

#[tokio::test]
async fn test_backend_quota_is_retried() {
    let backend = MockBackend::new().fail_times("busy", 1, MockBackendFailure::Quota);
    let acquirer = Arc::new(MockAcquirer::new().with_text("busy.txt", "busy text"));
    let pipeline = pipeline_with(Arc::new(backend), acquirer, config(2));

    let results = pipeline.run(["busy.txt"]).await;
    assert_eq!(summary(&results[0]), "summary of busy text");
}

#[tokio::test(start_paused = true)]
async fn test_attempt_timeout_counts_as_failure() {
    let acquirer = Arc::new(MockAcquirer::new().with_delay(Duration::from_secs(5)));
    let config = PipelineConfig::new()
        .with_retry(RetryPolicy::immediate(2))
        .with_task_timeout(Duration::from_secs(1));
    let pipeline = pipeline_with(Arc::new(MockBackend::new()), acquirer.clone(), config);

    let results = pipeline.run(["slow.txt"]).await;

    let failure = results[0].failure().unwrap();
    assert_eq!(failure.category, FailureCategory::Timeout);
    assert_eq!(failure.attempts, 2);
    assert_eq!(acquirer.attempts("slow.txt"), 2);
}

#[tokio::test(start_paused = true)]
async fn test_jitter_between_attempts() {
    let acquirer = Arc::new(MockAcquirer::new().fail_times("flaky.txt", 2, AcquisitionErrorKind::Network));
    let config = PipelineConfig::new().with_retry(
        RetryPolicy::new()
            .with_max_attempts(3)
            .with_delay_range(Duration::from_secs(1), Duration::from_secs(10)),
    );
    let pipeline = pipeline_with(Arc::new(MockBackend::new()), acquirer, config);

    let start = tokio::time::Instant::now();
    let results = pipeline.run(["flaky.txt"]).await;
    let elapsed = start.elapsed();

    assert!(results[0].is_success());
    assert!(elapsed >= Duration::from_secs(2), "elapsed {:?}", elapsed);
    assert!(elapsed <= Duration::from_secs(21), "elapsed {:?}", elapsed);
}

struct PanickingAcquirer;

#[async_trait]
impl Acquirer for PanickingAcquirer {
    async fn acquire(&self, locator: &Locator) -> Result<AcquiredContent, AcquisitionError> {
        if locator.raw() == "boom.txt" {
            panic!("acquirer exploded");
        }
        Ok(AcquiredContent::text(locator.raw()))
    }
}

#[tokio::test]
async fn test_panicking_task_becomes_internal_failure() {
    let pipeline = Pipeline::new(
        Arc::new(MockBackend::new()),
        Acquirers::uniform(Arc::new(PanickingAcquirer)),
        config(2),
    )
    .unwrap();

    let results = pipeline.run(["ok.txt", "boom.txt", "fine.txt"]).await;

    assert_eq!(summary(&results[0]), "summary of ok.txt");
    let failure = results[1].failure().unwrap();
    assert_eq!(failure.category, FailureCategory::Internal);
    assert!(failure.message.contains("acquirer exploded"));
    assert_eq!(summary(&results[2]), "summary of fine.txt");
    assert_eq!(pipeline.scheduler().active(), 0);
}

#[tokio::test]
async fn test_classification_through_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline_with(Arc::new(MockBackend::new()), Arc::new(MockAcquirer::new()), config(1));

    let cases = [
        ("https://wiki.example.com/spaces/X/pages/123", LocatorKind::WikiOrTicket),
        ("https://example.com/a", LocatorKind::Web),
        (dir.path().to_str().unwrap(), LocatorKind::Directory),
        ("photo.JPG", LocatorKind::Image),
        ("notes.txt", LocatorKind::PlainFile),
    ];
    for (raw, kind) in cases {
        let first = pipeline.classify(raw);
        assert_eq!(first.kind(), kind, "{}", raw);
        assert_eq!(first, pipeline.classify(raw));
    }
}

#[tokio::test]
async fn test_invalid_config_is_rejected() {
    let err = Pipeline::new(
        Arc::new(MockBackend::new()),
        Acquirers::uniform(Arc::new(MockAcquirer::new())),
        PipelineConfig::new().with_concurrency(0),
    )
    .err()
    .unwrap();
    assert!(err.to_string().contains("concurrency"));
}
