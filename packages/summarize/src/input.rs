//! Reading newline-delimited references.

use std::path::Path;

use tokio::io::AsyncReadExt;

/// One reference per line, trimmed. Blank lines are skipped.
pub fn parse_references(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read references from `path`, or from stdin when `None`.
pub async fn read_references(path: Option<&Path>) -> std::io::Result<Vec<String>> {
    let text = match path {
        Some(path) => tokio::fs::read_to_string(path).await?,
        None => {
            let mut text = String::new();
            tokio::io::stdin().read_to_string(&mut text).await?;
            text
        }
    };
    Ok(parse_references(&text))
}
