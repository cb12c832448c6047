//! Error type shared by every step of a backup run.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Which request a transport-level failure happened on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    FetchImage,
    CreateFolder,
    RequestUploadUrl,
    UploadBytes,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Step::FetchImage => "image fetch",
            Step::CreateFolder => "folder creation",
            Step::RequestUploadUrl => "upload URL request",
            Step::UploadBytes => "upload",
        };
        f.write_str(name)
    }
}

/// Broad failure class, used when reporting an aborted run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Input,
    Network,
    ResponseShape,
    FileWrite,
    Config,
}

#[derive(Error, Debug)]
pub enum BackupError {
    #[error("text must not be empty")]
    EmptyText,

    #[error("token must not be empty")]
    EmptyToken,

    #[error(
        "text '{text}' cannot be used as a file name \
         (path separators, control characters, '.' and '..' are not allowed)"
    )]
    UnsafeText { text: String },

    #[error("token contains characters that are not allowed in an HTTP header")]
    InvalidToken,

    #[error("{step} request failed: {source}")]
    Http {
        step: Step,
        #[source]
        source: reqwest::Error,
    },

    #[error("image API returned {status}")]
    ImageStatus { status: u16 },

    #[error("could not create remote folder: disk API returned {status}")]
    FolderCreate { status: u16 },

    #[error("upload URL response is not valid JSON: {source}")]
    UploadResponse {
        #[source]
        source: reqwest::Error,
    },

    #[error("upload URL response has no 'href'{}", parenthesized(.description))]
    MissingHref { description: Option<String> },

    #[error("upload of image bytes failed: storage returned {status}")]
    UploadTransfer { status: u16 },

    #[error("failed to write backup record '{path}': {source}")]
    RecordWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode backup record: {0}")]
    RecordEncode(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

impl BackupError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyText | Self::EmptyToken | Self::UnsafeText { .. } | Self::InvalidToken => {
                ErrorKind::Input
            }
            Self::Http { .. }
            | Self::ImageStatus { .. }
            | Self::FolderCreate { .. }
            | Self::UploadTransfer { .. } => ErrorKind::Network,
            Self::UploadResponse { .. } | Self::MissingHref { .. } => ErrorKind::ResponseShape,
            Self::RecordWrite { .. } | Self::RecordEncode(_) => ErrorKind::FileWrite,
            Self::Config(_) | Self::ClientBuild(_) => ErrorKind::Config,
        }
    }
}

fn parenthesized(detail: &Option<String>) -> String {
    match detail {
        Some(d) => format!(" ({})", d),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, BackupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_failure_class() {
        assert_eq!(BackupError::EmptyText.kind(), ErrorKind::Input);
        assert_eq!(BackupError::FolderCreate { status: 500 }.kind(), ErrorKind::Network);
        assert_eq!(BackupError::UploadTransfer { status: 507 }.kind(), ErrorKind::Network);
        assert_eq!(
            BackupError::MissingHref { description: None }.kind(),
            ErrorKind::ResponseShape
        );
        let write = BackupError::RecordWrite {
            path: PathBuf::from("backup_info_x.json"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(write.kind(), ErrorKind::FileWrite);
        assert_eq!(BackupError::Config("x".into()).kind(), ErrorKind::Config);
    }

    #[test]
    fn missing_href_display() {
        let err = BackupError::MissingHref { description: None };
        assert_eq!(err.to_string(), "upload URL response has no 'href'");

        let err = BackupError::MissingHref {
            description: Some("Unauthorized".into()),
        };
        assert_eq!(err.to_string(), "upload URL response has no 'href' (Unauthorized)");
    }

    #[test]
    fn unsafe_text_display() {
        let err = BackupError::UnsafeText { text: "a/b".into() };
        assert_eq!(
            err.to_string(),
            "text 'a/b' cannot be used as a file name \
             (path separators, control characters, '.' and '..' are not allowed)"
        );
    }

    #[test]
    fn status_errors_display() {
        assert_eq!(
            BackupError::FolderCreate { status: 401 }.to_string(),
            "could not create remote folder: disk API returned 401"
        );
        assert_eq!(Step::RequestUploadUrl.to_string(), "upload URL request");
    }
}
