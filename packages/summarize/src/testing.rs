//! Mock implementations for testing without network or model calls.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::{AcquisitionError, AcquisitionErrorKind, BackendError};
use crate::traits::{acquirer::Acquirer, backend::SummaryBackend};
use crate::types::{
    content::{AcquiredContent, ImageContent},
    locator::Locator,
};

/// Tracks how many calls are in flight and the highest count seen.
#[derive(Debug, Clone, Default)]
pub struct ConcurrencyGauge {
    active: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl ConcurrencyGauge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a call in flight until the guard drops.
    pub fn enter(&self) -> GaugeGuard {
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(active, Ordering::SeqCst);
        GaugeGuard {
            active: self.active.clone(),
        }
    }

    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

pub struct GaugeGuard {
    active: Arc<AtomicUsize>,
}

impl Drop for GaugeGuard {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Scripted failure: `remaining == None` fails forever.
#[derive(Debug, Clone)]
struct Script<K> {
    kind: K,
    remaining: Option<u32>,
}

impl<K: Copy> Script<K> {
    /// Consume one failure if any is left.
    fn fire(&mut self) -> Option<K> {
        match &mut self.remaining {
            None => Some(self.kind),
            Some(0) => None,
            Some(n) => {
                *n -= 1;
                Some(self.kind)
            }
        }
    }
}

/// Kind of error a [`MockBackend`] script produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockBackendFailure {
    /// Retryable provider error
    Provider,
    Quota,
    /// Not retryable
    Malformed,
}

impl MockBackendFailure {
    fn to_error(self, text: &str) -> BackendError {
        match self {
            Self::Provider => BackendError::provider(format!("mock provider failure for {:?}", text), true),
            Self::Quota => BackendError::QuotaExceeded("mock quota exhausted".into()),
            Self::Malformed => BackendError::MalformedResponse("mock malformed response".into()),
        }
    }
}

/// Record of a call made to the mock backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockBackendCall {
    Text { text: String },
    Image { width: u32, height: u32 },
}

/// A mock summarization backend.
///
/// Text summaries default to `summary of <text>`; image summaries to
/// `image <w>x<h>`. Failures are scripted by substring of the input text.
#[derive(Default)]
pub struct MockBackend {
    /// Predefined summaries by exact input text
    responses: Arc<RwLock<HashMap<String, String>>>,

    /// Scripted failures by substring of the input text
    failures: Arc<RwLock<Vec<(String, Script<MockBackendFailure>)>>>,

    /// Time each call takes
    delay: Duration,

    gauge: ConcurrencyGauge,

    /// Call tracking for assertions
    calls: Arc<RwLock<Vec<MockBackendCall>>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call take `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Answer `text` with `summary`.
    pub fn with_response(self, text: impl Into<String>, summary: impl Into<String>) -> Self {
        self.responses.write().unwrap().insert(text.into(), summary.into());
        self
    }

    /// Fail the first `times` calls whose text contains `pattern`.
    pub fn fail_times(self, pattern: impl Into<String>, times: u32, kind: MockBackendFailure) -> Self {
        self.script(pattern, kind, Some(times))
    }

    /// Fail every call whose text contains `pattern`.
    pub fn fail_always(self, pattern: impl Into<String>, kind: MockBackendFailure) -> Self {
        self.script(pattern, kind, None)
    }

    fn script(self, pattern: impl Into<String>, kind: MockBackendFailure, remaining: Option<u32>) -> Self {
        self.failures
            .write()
            .unwrap()
            .push((pattern.into(), Script { kind, remaining }));
        self
    }

    /// Get all calls made to this mock.
    pub fn calls(&self) -> Vec<MockBackendCall> {
        self.calls.read().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }

    /// Highest number of calls ever in flight at once.
    pub fn peak_concurrency(&self) -> usize {
        self.gauge.peak()
    }

    fn scripted_failure(&self, text: &str) -> Option<MockBackendFailure> {
        self.failures
            .write()
            .unwrap()
            .iter_mut()
            .filter(|(pattern, _)| text.contains(pattern.as_str()))
            .find_map(|(_, script)| script.fire())
    }

    async fn simulate(&self) -> GaugeGuard {
        let guard = self.gauge.enter();
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        guard
    }
}

#[async_trait]
impl SummaryBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn summarize_text(&self, text: &str) -> Result<String, BackendError> {
        self.calls.write().unwrap().push(MockBackendCall::Text {
            text: text.to_string(),
        });
        let _guard = self.simulate().await;

        if let Some(kind) = self.scripted_failure(text) {
            return Err(kind.to_error(text));
        }
        let canned = self.responses.read().unwrap().get(text).cloned();
        Ok(canned.unwrap_or_else(|| format!("summary of {}", text)))
    }

    async fn summarize_image(&self, image: &ImageContent) -> Result<String, BackendError> {
        self.calls.write().unwrap().push(MockBackendCall::Image {
            width: image.width,
            height: image.height,
        });
        let _guard = self.simulate().await;
        Ok(format!("image {}x{}", image.width, image.height))
    }
}

/// A mock acquirer keyed by raw reference.
///
/// Unknown references acquire as the text `content of <raw>`.
#[derive(Default)]
pub struct MockAcquirer {
    /// Predefined content by raw reference
    contents: Arc<RwLock<HashMap<String, AcquiredContent>>>,

    /// Scripted failures by raw reference
    failures: Arc<RwLock<HashMap<String, Script<AcquisitionErrorKind>>>>,

    delay: Duration,

    gauge: ConcurrencyGauge,

    /// Raw references acquired, in call order
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockAcquirer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_text(self, raw: impl Into<String>, text: impl Into<String>) -> Self {
        self.with_content(raw, AcquiredContent::Text(text.into()))
    }

    pub fn with_content(self, raw: impl Into<String>, content: AcquiredContent) -> Self {
        self.contents.write().unwrap().insert(raw.into(), content);
        self
    }

    /// Fail every acquisition of `raw`.
    pub fn fail(self, raw: impl Into<String>, kind: AcquisitionErrorKind) -> Self {
        self.failures
            .write()
            .unwrap()
            .insert(raw.into(), Script { kind, remaining: None });
        self
    }

    /// Fail the first `times` acquisitions of `raw`.
    pub fn fail_times(self, raw: impl Into<String>, times: u32, kind: AcquisitionErrorKind) -> Self {
        self.failures.write().unwrap().insert(
            raw.into(),
            Script {
                kind,
                remaining: Some(times),
            },
        );
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    /// Number of acquisitions of `raw`.
    pub fn attempts(&self, raw: &str) -> usize {
        self.calls.read().unwrap().iter().filter(|c| *c == raw).count()
    }

    pub fn peak_concurrency(&self) -> usize {
        self.gauge.peak()
    }
}

#[async_trait]
impl Acquirer for MockAcquirer {
    async fn acquire(&self, locator: &Locator) -> Result<AcquiredContent, AcquisitionError> {
        let raw = locator.raw();
        self.calls.write().unwrap().push(raw.to_string());
        let _guard = self.gauge.enter();
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let failure = self
            .failures
            .write()
            .unwrap()
            .get_mut(raw)
            .and_then(|script| script.fire());
        if let Some(kind) = failure {
            return Err(AcquisitionError::new(kind, format!("mock failure for {}", raw)));
        }

        let content = self.contents.read().unwrap().get(raw).cloned();
        Ok(content.unwrap_or_else(|| AcquiredContent::Text(format!("content of {}", raw))))
    }
}
