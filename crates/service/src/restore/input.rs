//! Input loading: raw bytes from a file or stdin, parsed into records.

use std::path::PathBuf;

use serde_json::Value;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::errors::RestoreError;
use crate::record::{type_name, ConfigRecord};

/// Where the restore input comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    File(PathBuf),
    Stdin,
}

impl InputSource {
    /// `None` or `-` means standard input.
    pub fn from_arg(path: Option<PathBuf>) -> Self {
        match path {
            Some(p) if p.as_os_str() != "-" => InputSource::File(p),
            _ => InputSource::Stdin,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            InputSource::File(p) => p.display().to_string(),
            InputSource::Stdin => "<stdin>".to_string(),
        }
    }
}

/// Read the whole source into memory.
pub async fn read_source(source: &InputSource) -> Result<Vec<u8>, RestoreError> {
    match source {
        InputSource::File(path) => tokio::fs::read(path)
            .await
            .map_err(|e| RestoreError::Io(format!("{}: {}", path.display(), e))),
        InputSource::Stdin => read_stream(tokio::io::stdin(), "<stdin>").await,
    }
}

/// Drain a byte stream; `label` names it in error messages.
pub async fn read_stream<R: AsyncRead + Unpin>(mut reader: R, label: &str) -> Result<Vec<u8>, RestoreError> {
    let mut buf = Vec::new();
    reader
        .read_to_end(&mut buf)
        .await
        .map_err(|e| RestoreError::Io(format!("{label}: {e}")))?;
    Ok(buf)
}

/// Decode UTF-8, parse JSON and check the shape: an array of objects that
/// each carry a string `key`. Nothing here touches the store.
pub fn parse_records(bytes: &[u8]) -> Result<Vec<ConfigRecord>, RestoreError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| RestoreError::InvalidInput(format!("input is not valid UTF-8: {e}")))?;

    let data: Value = serde_json::from_str(text).map_err(|e| {
        RestoreError::InvalidInput(format!("{e}. Expected a valid JSON array."))
    })?;

    let Value::Array(items) = data else {
        return Err(RestoreError::InvalidInput(format!(
            "expected a valid JSON array, got {}",
            type_name(&data)
        )));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| {
            ConfigRecord::try_from(item)
                .map_err(|e| RestoreError::InvalidInput(format!("record #{idx}: {e}")))
        })
        .collect()
}

/// `read_source` followed by `parse_records`.
pub async fn load_records(source: &InputSource) -> Result<Vec<ConfigRecord>, RestoreError> {
    let bytes = read_source(source).await?;
    parse_records(&bytes)
}
