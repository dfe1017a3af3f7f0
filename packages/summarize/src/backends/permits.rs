//! Permit pool around a backend.
//!
//! Bounds in-flight calls into one backend instance independently of the
//! scheduler ceiling.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Semaphore, SemaphorePermit};
use tracing::trace;

use crate::error::BackendError;
use crate::traits::backend::SummaryBackend;
use crate::types::content::ImageContent;

pub const DEFAULT_BACKEND_PERMITS: usize = 5;

/// A backend wrapper that holds a permit for the duration of every call.
pub struct PermitLimited<B> {
    inner: B,
    permits: Arc<Semaphore>,
    capacity: usize,
}

impl<B: SummaryBackend> PermitLimited<B> {
    /// Wrap `backend` with a pool of `permits` (at least one).
    pub fn new(backend: B, permits: usize) -> Self {
        let capacity = permits.max(1);
        Self {
            inner: backend,
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Permits not currently held.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }

    async fn permit(&self) -> Result<SemaphorePermit<'_>, BackendError> {
        let permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| BackendError::provider("backend permit pool closed", false))?;
        trace!(backend = self.inner.name(), available = self.available(), "backend permit acquired");
        Ok(permit)
    }
}

#[async_trait]
impl<B: SummaryBackend> SummaryBackend for PermitLimited<B> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn chunk(&self, text: &str) -> Vec<String> {
        self.inner.chunk(text)
    }

    async fn summarize_text(&self, text: &str) -> Result<String, BackendError> {
        let _permit = self.permit().await?;
        self.inner.summarize_text(text).await
    }

    async fn summarize_image(&self, image: &ImageContent) -> Result<String, BackendError> {
        let _permit = self.permit().await?;
        self.inner.summarize_image(image).await
    }
}

/// Extension trait for wrapping backends.
pub trait SummaryBackendExt: SummaryBackend + Sized {
    /// Bound concurrent calls into this backend.
    fn with_permits(self, permits: usize) -> PermitLimited<Self> {
        PermitLimited::new(self, permits)
    }
}

impl<B: SummaryBackend> SummaryBackendExt for B {}
