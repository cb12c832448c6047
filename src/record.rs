// Data that flows through a backup run: the validated user input, the
// fetched image bytes and the JSON record written once the upload is done.

use crate::error::{BackupError, Result};
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Caption text plus the disk OAuth token. Both are non-empty and the
/// text is safe to use as a file name.
#[derive(Debug, Clone)]
pub struct BackupRequest {
    text: String,
    token: String,
}

impl BackupRequest {
    pub fn new(text: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let text = text.into();
        let token = token.into();
        if text.is_empty() {
            return Err(BackupError::EmptyText);
        }
        if token.is_empty() {
            return Err(BackupError::EmptyToken);
        }
        validate_text(&text)?;
        Ok(BackupRequest { text, token })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// `{text}.jpg`
    pub fn file_name(&self) -> String {
        format!("{}.jpg", self.text)
    }

    /// `{folder}/{text}.jpg`
    pub fn remote_path(&self, folder: &str) -> String {
        format!("{}/{}", folder, self.file_name())
    }

    /// `backup_info_{text}.json`
    pub fn record_file_name(&self) -> String {
        format!("backup_info_{}.json", self.text)
    }
}

/// The text ends up as a path component both remotely and locally, so
/// anything that could escape the target directory is refused.
fn validate_text(text: &str) -> Result<()> {
    let unsafe_char = text
        .chars()
        .any(|c| c == '/' || c == '\\' || c.is_control());
    if unsafe_char || text == "." || text == ".." {
        return Err(BackupError::UnsafeText { text: text.to_string() });
    }
    Ok(())
}

/// Raw image as returned by the image API. Never written to disk.
#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    pub source_url: String,
}

impl FetchedImage {
    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Split into the bytes to upload and what the record keeps.
    pub fn into_parts(self) -> (Vec<u8>, ImageSummary) {
        let summary = ImageSummary {
            size_bytes: self.size_bytes(),
            source_url: self.source_url,
        };
        (self.bytes, summary)
    }
}

/// What is left of a `FetchedImage` once its bytes are handed to the upload.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSummary {
    pub size_bytes: u64,
    pub source_url: String,
}

/// Summary of one completed backup. Keys match the `backup_info_*.json`
/// files the tool has always produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupRecord {
    pub file_name: String,
    pub file_size_bytes: u64,
    pub file_size_mb: f64,
    #[serde(rename = "upload_date")]
    pub upload_timestamp: String,
    pub source_url: String,
    pub text_on_image: String,
    #[serde(rename = "yandex_path")]
    pub remote_path: String,
}

impl BackupRecord {
    pub fn new(
        request: &BackupRequest,
        image: ImageSummary,
        remote_path: String,
        uploaded_at: NaiveDateTime,
    ) -> Self {
        BackupRecord {
            file_name: request.file_name(),
            file_size_bytes: image.size_bytes,
            file_size_mb: size_in_mb(image.size_bytes),
            upload_timestamp: iso_timestamp(uploaded_at),
            source_url: image.source_url,
            text_on_image: request.text().to_string(),
            remote_path,
        }
    }

    /// Write as pretty JSON to `dir/file_name`, replacing any previous file.
    pub fn save(&self, dir: &Path, file_name: &str) -> Result<PathBuf> {
        let path = dir.join(file_name);
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&path, json).map_err(|source| BackupError::RecordWrite {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

/// Megabytes rounded to two decimals.
pub fn size_in_mb(bytes: u64) -> f64 {
    (bytes as f64 / BYTES_PER_MB * 100.0).round() / 100.0
}

/// Local wall-clock time of "now", without offset.
pub fn now_local() -> NaiveDateTime {
    Local::now().naive_local()
}

pub fn iso_timestamp(at: NaiveDateTime) -> String {
    at.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}
