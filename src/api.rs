// API client module: a small blocking HTTP client for the two services a
// backup talks to. cataas.com renders the captioned picture, the Yandex.Disk
// REST API hands out upload slots and receives the bytes.

use crate::config::BackupConfig;
use crate::error::{BackupError, Result, Step};
use log::debug;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{StatusCode, Url};
use serde::Deserialize;

/// Outcome of the folder-creation call. Both count as success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderStatus {
    Created,
    AlreadyExists,
}

/// Body of `GET /resources/upload`. On success the disk API returns
/// `href`; on failure it returns `error`/`description` instead, so every
/// field is optional here and `href` is checked by hand.
#[derive(Deserialize, Debug, Default)]
pub struct UploadLinkResponse {
    pub href: Option<String>,
    pub error: Option<String>,
    pub description: Option<String>,
}

impl UploadLinkResponse {
    /// The upload URL, or `MissingHref` carrying whatever explanation the
    /// service gave.
    pub fn into_href(self) -> Result<String> {
        match self.href {
            Some(href) if !href.is_empty() => Ok(href),
            _ => Err(BackupError::MissingHref {
                description: self.description.or(self.error),
            }),
        }
    }
}

/// Holds a reqwest blocking client (with the configured timeout) and the
/// base URLs of both services.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    image_base_url: String,
    disk_api_url: String,
}

impl ApiClient {
    pub fn new(config: &BackupConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(BackupError::ClientBuild)?;
        Ok(ApiClient {
            client,
            image_base_url: config.image_base_url.trim_end_matches('/').to_string(),
            disk_api_url: config.disk_api_url.trim_end_matches('/').to_string(),
        })
    }

    /// `{image_base}/cat/says/{text}` with the text percent-encoded as a
    /// single path segment.
    pub fn image_url(&self, text: &str) -> Result<Url> {
        let base = &self.image_base_url;
        let mut url = Url::parse(base)
            .map_err(|e| BackupError::Config(format!("bad image API URL '{}': {}", base, e)))?;
        url.path_segments_mut()
            .map_err(|_| {
                BackupError::Config(format!("image API URL '{}' cannot take a path", base))
            })?
            .pop_if_empty()
            .extend(["cat", "says", text]);
        Ok(url)
    }

    /// Headers for disk API calls: `Authorization: OAuth <token>`.
    fn disk_headers(token: &str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let val = HeaderValue::from_str(&format!("OAuth {}", token))
            .map_err(|_| BackupError::InvalidToken)?;
        headers.insert(AUTHORIZATION, val);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    /// GET the captioned picture. Any non-2xx status is an error.
    pub fn fetch_image(&self, url: &Url) -> Result<Vec<u8>> {
        debug!("GET {}", url);
        let res = self
            .client
            .get(url.clone())
            .send()
            .map_err(|source| BackupError::Http { step: Step::FetchImage, source })?;
        if !res.status().is_success() {
            return Err(BackupError::ImageStatus {
                status: res.status().as_u16(),
            });
        }
        let bytes = res
            .bytes()
            .map_err(|source| BackupError::Http { step: Step::FetchImage, source })?;
        Ok(bytes.to_vec())
    }

    /// PUT `/resources?path=<folder>`. 201 and 409 are both fine.
    pub fn ensure_folder(&self, token: &str, folder: &str) -> Result<FolderStatus> {
        let url = format!("{}/resources", self.disk_api_url);
        debug!("PUT {} path={}", url, folder);
        let res = self
            .client
            .put(&url)
            .headers(Self::disk_headers(token)?)
            .query(&[("path", folder)])
            .send()
            .map_err(|source| BackupError::Http { step: Step::CreateFolder, source })?;
        match res.status() {
            StatusCode::CREATED => Ok(FolderStatus::Created),
            StatusCode::CONFLICT => Ok(FolderStatus::AlreadyExists),
            other => Err(BackupError::FolderCreate { status: other.as_u16() }),
        }
    }

    /// GET `/resources/upload?path=<path>&overwrite=true` and pull out the
    /// upload URL. The status code is not checked: the body decides.
    pub fn request_upload_url(&self, token: &str, remote_path: &str) -> Result<String> {
        let url = format!("{}/resources/upload", self.disk_api_url);
        debug!("GET {} path={}", url, remote_path);
        let res = self
            .client
            .get(&url)
            .headers(Self::disk_headers(token)?)
            .query(&[("path", remote_path), ("overwrite", "true")])
            .send()
            .map_err(|source| BackupError::Http {
                step: Step::RequestUploadUrl,
                source,
            })?;
        let body: UploadLinkResponse = res
            .json()
            .map_err(|source| BackupError::UploadResponse { source })?;
        body.into_href()
    }

    /// PUT the raw bytes to the upload slot. Only 201 means stored.
    pub fn upload_bytes(&self, href: &str, bytes: Vec<u8>) -> Result<()> {
        debug!("PUT {} ({} bytes)", href, bytes.len());
        let res = self
            .client
            .put(href)
            .body(bytes)
            .send()
            .map_err(|source| BackupError::Http { step: Step::UploadBytes, source })?;
        if res.status() != StatusCode::CREATED {
            return Err(BackupError::UploadTransfer {
                status: res.status().as_u16(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_for(base: &str) -> ApiClient {
        let config = BackupConfig {
            image_base_url: base.into(),
            ..BackupConfig::default()
        };
        ApiClient::new(&config).unwrap()
    }

    #[test]
    fn image_url_plain_text() {
        let api = client_for("https://cataas.com");
        assert_eq!(
            api.image_url("hello").unwrap().as_str(),
            "https://cataas.com/cat/says/hello"
        );
    }

    #[test]
    fn image_url_encodes_segment() {
        let api = client_for("https://cataas.com/");
        assert_eq!(
            api.image_url("good morning?").unwrap().as_str(),
            "https://cataas.com/cat/says/good%20morning%3F"
        );
    }

    #[test]
    fn image_url_keeps_base_path() {
        let api = client_for("http://127.0.0.1:8080/proxy");
        assert_eq!(
            api.image_url("hi").unwrap().as_str(),
            "http://127.0.0.1:8080/proxy/cat/says/hi"
        );
    }

    #[test]
    fn bad_image_base_is_config_error() {
        let api = client_for("not a url");
        assert!(matches!(api.image_url("hi"), Err(BackupError::Config(_))));
    }

    #[test]
    fn upload_link_parsing() {
        let ok: UploadLinkResponse = serde_json::from_str(
            r#"{"href":"https://uploader/slot","method":"PUT","templated":false}"#,
        )
        .unwrap();
        assert_eq!(ok.into_href().unwrap(), "https://uploader/slot");

        let err: UploadLinkResponse = serde_json::from_str(
            r#"{"description":"Unauthorized","error":"UnauthorizedError"}"#,
        )
        .unwrap();
        match err.into_href() {
            Err(BackupError::MissingHref { description }) => {
                assert_eq!(description.as_deref(), Some("Unauthorized"))
            }
            other => panic!("unexpected {:?}", other),
        }

        let empty: UploadLinkResponse = serde_json::from_str("{}").unwrap();
        assert!(matches!(
            empty.into_href(),
            Err(BackupError::MissingHref { description: None })
        ));
    }

    #[test]
    fn token_with_newline_is_rejected() {
        assert!(matches!(
            ApiClient::disk_headers("abc\ndef"),
            Err(BackupError::InvalidToken)
        ));
        let headers = ApiClient::disk_headers("abc").unwrap();
        assert_eq!(headers[AUTHORIZATION], "OAuth abc");
    }
}
