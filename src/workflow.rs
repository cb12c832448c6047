// The backup itself: fetch the picture, make sure the folder exists, get an
// upload slot, push the bytes, then write the local record. Each step
// returns a `Result` and the first failure ends the run.

use crate::api::{ApiClient, FolderStatus};
use crate::config::BackupConfig;
use crate::error::{BackupError, ErrorKind, Result};
use crate::record::{now_local, BackupRecord, BackupRequest, FetchedImage};
use log::{error, info};
use std::path::PathBuf;

/// What the workflow is doing or has just finished, for UI narration.
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    FetchingImage { url: String },
    ImageFetched { size_bytes: u64 },
    EnsuringFolder { folder: String },
    FolderReady { folder: String, status: FolderStatus },
    RequestingUploadUrl { remote_path: String },
    Uploading { remote_path: String },
    Uploaded { folder: String, file_name: String },
    SavingRecord { path: PathBuf },
    RecordSaved { path: PathBuf },
}

impl std::fmt::Display for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Progress::FetchingImage { url } => write!(f, "Fetching picture from {}", url),
            Progress::ImageFetched { size_bytes } => {
                write!(f, "Picture received: {} bytes", size_bytes)
            }
            Progress::EnsuringFolder { folder } => write!(f, "Preparing folder {}", folder),
            Progress::FolderReady { folder, status } => match status {
                FolderStatus::Created => write!(f, "Created folder {}", folder),
                FolderStatus::AlreadyExists => write!(f, "Folder {} already exists", folder),
            },
            Progress::RequestingUploadUrl { remote_path } => {
                write!(f, "Requesting upload link for {}", remote_path)
            }
            Progress::Uploading { remote_path } => write!(f, "Uploading {}", remote_path),
            Progress::Uploaded { folder, file_name } => write!(
                f,
                "Uploaded to Yandex.Disk (folder: {}, file: {})",
                folder, file_name
            ),
            Progress::SavingRecord { path } => write!(f, "Saving record to {}", path.display()),
            Progress::RecordSaved { path } => write!(f, "Record saved to {}", path.display()),
        }
    }
}

pub struct BackupWorkflow {
    api: ApiClient,
    config: BackupConfig,
}

impl BackupWorkflow {
    pub fn new(config: BackupConfig) -> Result<Self> {
        let api = ApiClient::new(&config)?;
        Ok(BackupWorkflow { api, config })
    }

    /// Run a backup, logging any failure and returning `None` instead.
    pub fn run(&self, request: &BackupRequest) -> Option<BackupRecord> {
        self.run_with_progress(request, |_| {})
    }

    /// Like `run`, reporting each step to `on_progress`.
    pub fn run_with_progress<F>(
        &self,
        request: &BackupRequest,
        on_progress: F,
    ) -> Option<BackupRecord>
    where
        F: FnMut(Progress),
    {
        match self.try_run(request, on_progress) {
            Ok(record) => Some(record),
            Err(e) => {
                self.log_failure(request, &e);
                None
            }
        }
    }

    /// Log an aborted run once. Callers that draw to the terminal
    /// themselves use `try_run` and call this after clearing their output.
    pub fn log_failure(&self, request: &BackupRequest, err: &BackupError) {
        error!("{}", self.failure_message(request, err));
    }

    /// The single human-readable line for an aborted run.
    pub fn failure_message(&self, request: &BackupRequest, err: &BackupError) -> String {
        if err.kind() == ErrorKind::FileWrite {
            format!(
                "backup of '{}' failed: {} (the picture stays uploaded at {})",
                request.text(),
                err,
                request.remote_path(&self.config.folder)
            )
        } else {
            format!("backup of '{}' failed: {}", request.text(), err)
        }
    }

    /// The full sequence with errors propagated to the caller.
    pub fn try_run<F>(&self, request: &BackupRequest, mut on_progress: F) -> Result<BackupRecord>
    where
        F: FnMut(Progress),
    {
        let folder = self.config.folder.as_str();

        // 1. picture
        let url = self.api.image_url(request.text())?;
        on_progress(Progress::FetchingImage { url: url.to_string() });
        let image = FetchedImage {
            bytes: self.api.fetch_image(&url)?,
            source_url: url.to_string(),
        };
        info!("fetched {} bytes from {}", image.size_bytes(), image.source_url);
        on_progress(Progress::ImageFetched {
            size_bytes: image.size_bytes(),
        });

        // 2. folder
        on_progress(Progress::EnsuringFolder { folder: folder.into() });
        let status = self.api.ensure_folder(request.token(), folder)?;
        info!("folder {} ready ({:?})", folder, status);
        on_progress(Progress::FolderReady {
            folder: folder.into(),
            status,
        });

        // 3. upload slot
        let remote_path = request.remote_path(folder);
        on_progress(Progress::RequestingUploadUrl {
            remote_path: remote_path.clone(),
        });
        let href = self.api.request_upload_url(request.token(), &remote_path)?;

        // 4. bytes
        on_progress(Progress::Uploading {
            remote_path: remote_path.clone(),
        });
        let (bytes, summary) = image.into_parts();
        self.api.upload_bytes(&href, bytes)?;
        let uploaded_at = now_local();
        info!("uploaded {}", remote_path);
        on_progress(Progress::Uploaded {
            folder: folder.into(),
            file_name: request.file_name(),
        });

        // 5. record
        let record = BackupRecord::new(request, summary, remote_path, uploaded_at);
        let record_name = request.record_file_name();
        on_progress(Progress::SavingRecord {
            path: self.config.output_dir.join(&record_name),
        });
        let path = record.save(&self.config.output_dir, &record_name)?;
        info!("record written to {}", path.display());
        on_progress(Progress::RecordSaved { path });

        Ok(record)
    }
}

impl std::fmt::Debug for BackupWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackupWorkflow").field("config", &self.config).finish()
    }
}
