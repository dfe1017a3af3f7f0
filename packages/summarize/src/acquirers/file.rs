//! Plain file acquisition.

use async_trait::async_trait;
use tracing::debug;

use crate::error::AcquisitionError;
use crate::traits::acquirer::Acquirer;
use crate::types::{content::AcquiredContent, locator::Locator};

/// Reads a local file as text. Invalid UTF-8 is replaced, not rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileAcquirer;

#[async_trait]
impl Acquirer for FileAcquirer {
    async fn acquire(&self, locator: &Locator) -> Result<AcquiredContent, AcquisitionError> {
        let path = locator
            .path()
            .ok_or_else(|| AcquisitionError::malformed(format!("{} is not a local path", locator)))?;

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| AcquisitionError::from_io(locator.raw(), e))?;
        debug!(uri = %locator, bytes = bytes.len(), "read file");

        Ok(AcquiredContent::Text(String::from_utf8_lossy(&bytes).into_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::error::AcquisitionErrorKind;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_reads_lossy_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"caf\xC3\xA9 \xFF ok").unwrap();

        let locator = classify(path.to_str().unwrap());
        let content = assert_ok!(FileAcquirer.acquire(&locator).await);
        assert_eq!(content, AcquiredContent::text("café \u{FFFD} ok"));
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let locator = classify(dir.path().join("absent.txt").to_str().unwrap());

        let err = assert_err!(FileAcquirer.acquire(&locator).await);
        assert_eq!(err.kind, AcquisitionErrorKind::NotFound);
        assert!(!err.is_transient());
    }
}
