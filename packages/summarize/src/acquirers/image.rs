//! Image file acquisition.

use async_trait::async_trait;
use tracing::debug;

use crate::error::AcquisitionError;
use crate::traits::acquirer::Acquirer;
use crate::types::{
    content::{AcquiredContent, ImageContent},
    locator::Locator,
};

/// Reads a local PNG or JPEG and validates its header.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageAcquirer;

#[async_trait]
impl Acquirer for ImageAcquirer {
    async fn acquire(&self, locator: &Locator) -> Result<AcquiredContent, AcquisitionError> {
        let path = locator
            .path()
            .ok_or_else(|| AcquisitionError::malformed(format!("{} is not a local path", locator)))?;

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| AcquisitionError::from_io(locator.raw(), e))?;

        let image = ImageContent::decode(bytes)
            .map_err(|e| AcquisitionError::new(e.kind, format!("{}: {}", locator, e.message)))?;
        debug!(
            uri = %locator,
            format = %image.format,
            width = image.width,
            height = image.height,
            "decoded image"
        );

        Ok(AcquiredContent::Image(image))
    }
}
