//! Acquisition trait.

use async_trait::async_trait;

use crate::error::AcquisitionError;
use crate::types::{content::AcquiredContent, locator::Locator};

/// Turns a classified locator into raw content.
///
/// One implementation per [`LocatorKind`](crate::types::locator::LocatorKind),
/// except directories, which the pipeline expands itself.
#[async_trait]
pub trait Acquirer: Send + Sync {
    async fn acquire(&self, locator: &Locator) -> Result<AcquiredContent, AcquisitionError>;
}
