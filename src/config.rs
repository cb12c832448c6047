// Runtime configuration: where the two services live, which remote folder
// receives the pictures, how long any single request may take and where
// the JSON record is written.

use crate::error::BackupError;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_IMAGE_BASE_URL: &str = "https://cataas.com";
pub const DEFAULT_DISK_API_URL: &str = "https://cloud-api.yandex.net/v1/disk";
pub const DEFAULT_FOLDER: &str = "Fpy-134";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

const IMAGE_URL_VAR: &str = "CATBACKUP_IMAGE_URL";
const DISK_URL_VAR: &str = "CATBACKUP_DISK_URL";
const TIMEOUT_VAR: &str = "CATBACKUP_TIMEOUT_SECS";

#[derive(Debug, Clone)]
pub struct BackupConfig {
    /// Base URL of the image service; `/cat/says/{text}` is appended.
    pub image_base_url: String,
    /// Base URL of the disk REST API (`.../v1/disk`).
    pub disk_api_url: String,
    /// Remote folder that receives `{text}.jpg`.
    pub folder: String,
    /// Applied to every outbound request.
    pub timeout: Duration,
    /// Directory for `backup_info_{text}.json`. Always the current
    /// directory from the CLI; only set otherwise by library callers.
    pub output_dir: PathBuf,
}

impl Default for BackupConfig {
    fn default() -> Self {
        BackupConfig {
            image_base_url: DEFAULT_IMAGE_BASE_URL.into(),
            disk_api_url: DEFAULT_DISK_API_URL.into(),
            folder: DEFAULT_FOLDER.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            output_dir: PathBuf::from("."),
        }
    }
}

impl BackupConfig {
    /// Defaults, with endpoint and timeout overrides taken from the
    /// `CATBACKUP_*` environment variables when they are set. The folder
    /// and the record location are not overridable.
    pub fn from_env() -> Result<Self, BackupError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` but reads values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BackupError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = BackupConfig::default();

        if let Some(url) = non_empty(lookup(IMAGE_URL_VAR)) {
            config.image_base_url = url;
        }
        if let Some(url) = non_empty(lookup(DISK_URL_VAR)) {
            config.disk_api_url = url;
        }
        if let Some(raw) = non_empty(lookup(TIMEOUT_VAR)) {
            let secs: u64 = raw.parse().map_err(|_| {
                BackupError::Config(format!(
                    "{} must be a whole number of seconds, got '{}'",
                    TIMEOUT_VAR, raw
                ))
            })?;
            if secs == 0 {
                return Err(BackupError::Config(format!(
                    "{} must be greater than zero",
                    TIMEOUT_VAR
                )));
            }
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_overrides() {
        let config = BackupConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.image_base_url, "https://cataas.com");
        assert_eq!(config.disk_api_url, "https://cloud-api.yandex.net/v1/disk");
        assert_eq!(config.folder, "Fpy-134");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.output_dir, PathBuf::from("."));
    }

    #[test]
    fn overrides_are_applied() {
        let config = BackupConfig::from_lookup(lookup_from(&[
            ("CATBACKUP_IMAGE_URL", "http://localhost:9000"),
            ("CATBACKUP_DISK_URL", "http://localhost:9001/v1/disk"),
            ("CATBACKUP_TIMEOUT_SECS", "3"),
        ]))
        .unwrap();
        assert_eq!(config.image_base_url, "http://localhost:9000");
        assert_eq!(config.disk_api_url, "http://localhost:9001/v1/disk");
        assert_eq!(config.timeout, Duration::from_secs(3));
        // folder is fixed
        assert_eq!(config.folder, "Fpy-134");
    }

    #[test]
    fn record_location_is_not_overridable() {
        let config = BackupConfig::from_lookup(lookup_from(&[
            ("CATBACKUP_OUTPUT_DIR", "/tmp/records"),
            ("CATBACKUP_FOLDER", "Elsewhere"),
        ]))
        .unwrap();
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert_eq!(config.folder, DEFAULT_FOLDER);
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let lookup = lookup_from(&[("CATBACKUP_IMAGE_URL", "   ")]);
        let config = BackupConfig::from_lookup(lookup).unwrap();
        assert_eq!(config.image_base_url, DEFAULT_IMAGE_BASE_URL);
    }

    #[test]
    fn bad_timeout_is_rejected() {
        let lookup = lookup_from(&[("CATBACKUP_TIMEOUT_SECS", "soon")]);
        let err = BackupConfig::from_lookup(lookup).unwrap_err();
        assert!(matches!(err, BackupError::Config(_)));

        let lookup = lookup_from(&[("CATBACKUP_TIMEOUT_SECS", "0")]);
        let err = BackupConfig::from_lookup(lookup).unwrap_err();
        assert!(err.to_string().contains("greater than zero"));
    }
}
