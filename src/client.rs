//! Google Drive API client for the storage operations.

use std::path::Path;

use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, Response};
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

use crate::auth::Authenticator;
use crate::config::Config;
use crate::error::{DriveError, Result};
use crate::models::{
    format_mebibytes, ApiErrorResponse, FileListResponse, RemoteFile, CSV_MIME_TYPE,
    FOLDER_MIME_TYPE,
};
use crate::receiver::{CodeReceiver, LocalServerReceiver};

/// Base URL for Google Drive API v3.
pub const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

/// Upload URL for Google Drive API.
pub const UPLOAD_API_BASE: &str = "https://www.googleapis.com/upload/drive/v3";

/// Files larger than this go through a resumable upload (500 MiB).
pub const RESUMABLE_THRESHOLD: u64 = 500 * 1024 * 1024;

/// Fields requested for every returned file.
const FILE_FIELDS: &str = "id, name, mimeType, parents, createdTime";

/// Storage operations offered to the command dispatcher.
#[async_trait]
pub trait DriveOperations: Send + Sync {
    /// Upload a local file as `name` into `parent_id`.
    async fn upload_file(
        &self,
        local_path: &Path,
        name: &str,
        mime_type: &str,
        parent_id: &str,
    ) -> Result<RemoteFile>;

    /// Create a folder named `name` under `parent_id`.
    async fn create_folder(&self, name: &str, parent_id: &str) -> Result<RemoteFile>;

    /// Non-trashed, non-folder children of `folder_id`.
    async fn list_folder_contents(&self, folder_id: &str) -> Result<Vec<RemoteFile>>;

    /// Upload a CSV data file under a timestamped name into the default folder.
    async fn upload_dated_data_file(&self, local_path: &Path) -> Result<RemoteFile>;
}

/// Name of a data file uploaded at `now`.
pub fn data_file_name(now: NaiveDateTime) -> String {
    format!("data_{}.csv", now.format("%Y%m%d_%H%M%S"))
}

/// Drive query selecting the listable children of `folder_id`.
pub fn folder_contents_query(folder_id: &str) -> String {
    format!(
        "'{}' in parents and mimeType != '{}' and trashed = false",
        folder_id.replace('\'', "\\'"),
        FOLDER_MIME_TYPE
    )
}

/// Client for the Google Drive v3 API.
pub struct DriveClient<R = LocalServerReceiver> {
    auth: Authenticator<R>,
    http: Client,
    default_folder_id: String,
    api_base: String,
    upload_base: String,
    resumable_threshold: u64,
}

impl<R: CodeReceiver> DriveClient<R> {
    /// Create a new DriveClient.
    ///
    /// # Arguments
    /// * `config` - Supplies the user agent and the default folder
    /// * `auth` - Authenticator consulted before every request
    pub fn new(config: &Config, auth: Authenticator<R>) -> Result<Self> {
        let http = Client::builder()
            .user_agent(config.application_name.as_str())
            .build()?;

        Ok(Self {
            auth,
            http,
            default_folder_id: config.default_folder_id.clone(),
            api_base: DRIVE_API_BASE.to_string(),
            upload_base: UPLOAD_API_BASE.to_string(),
            resumable_threshold: RESUMABLE_THRESHOLD,
        })
    }

    /// Point the client at other API endpoints.
    pub fn with_endpoints(mut self, api_base: &str, upload_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self.upload_base = upload_base.trim_end_matches('/').to_string();
        self
    }

    /// Size above which uploads are streamed in a resumable session.
    pub fn with_resumable_threshold(mut self, bytes: u64) -> Self {
        self.resumable_threshold = bytes;
        self
    }

    async fn access_token(&self) -> Result<String> {
        Ok(self.auth.authorize().await?.access_token)
    }

    /// Upload a file using multipart upload (for smaller files).
    async fn upload_multipart(
        &self,
        local_path: &Path,
        metadata: serde_json::Value,
        name: &str,
        mime_type: &str,
    ) -> Result<RemoteFile> {
        let token = self.access_token().await?;
        let file_content = tokio::fs::read(local_path)
            .await
            .map_err(|source| DriveError::LocalFileError {
                path: local_path.to_path_buf(),
                source,
            })?;

        let metadata_part = Part::text(metadata.to_string()).mime_str("application/json")?;

        let file_part = Part::bytes(file_content)
            .file_name(name.to_string())
            .mime_str(mime_type)?;

        let form = Form::new()
            .part("metadata", metadata_part)
            .part("file", file_part);

        let response = self
            .http
            .post(format!("{}/files", self.upload_base))
            .bearer_auth(&token)
            .query(&[
                ("uploadType", "multipart"),
                ("supportsAllDrives", "true"),
                ("fields", FILE_FIELDS),
            ])
            .multipart(form)
            .send()
            .await?;

        let response = check_response(response).await?;
        Ok(response.json().await?)
    }

    /// Upload a file using resumable upload (for larger files).
    async fn upload_resumable(
        &self,
        local_path: &Path,
        metadata: serde_json::Value,
        mime_type: &str,
        file_size: u64,
    ) -> Result<RemoteFile> {
        let token = self.access_token().await?;

        // Step 1: Initiate resumable upload
        let init_response = self
            .http
            .post(format!("{}/files", self.upload_base))
            .bearer_auth(&token)
            .query(&[("uploadType", "resumable"), ("supportsAllDrives", "true")])
            .header("X-Upload-Content-Type", mime_type)
            .header("X-Upload-Content-Length", file_size.to_string())
            .json(&metadata)
            .send()
            .await?;

        let init_response = check_response(init_response).await?;

        let upload_url = init_response
            .headers()
            .get("Location")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| DriveError::ApiError {
                status: 500,
                message: "No upload URL in response".to_string(),
            })?
            .to_string();

        // Step 2: Stream the file content
        let file = File::open(local_path)
            .await
            .map_err(|source| DriveError::LocalFileError {
                path: local_path.to_path_buf(),
                source,
            })?;

        let upload_response = self
            .http
            .put(&upload_url)
            .header("Content-Type", mime_type)
            .header("Content-Length", file_size.to_string())
            .query(&[("fields", FILE_FIELDS)])
            .body(Body::wrap_stream(ReaderStream::new(file)))
            .send()
            .await?;

        let upload_response = check_response(upload_response).await?;
        Ok(upload_response.json().await?)
    }
}

#[async_trait]
impl<R: CodeReceiver> DriveOperations for DriveClient<R> {
    async fn upload_file(
        &self,
        local_path: &Path,
        name: &str,
        mime_type: &str,
        parent_id: &str,
    ) -> Result<RemoteFile> {
        let file_size = tokio::fs::metadata(local_path)
            .await
            .map_err(|source| DriveError::LocalFileError {
                path: local_path.to_path_buf(),
                source,
            })?
            .len();

        info!("Upload file size: {} MBytes.", format_mebibytes(file_size));

        let metadata = serde_json::json!({
            "name": name,
            "parents": [parent_id]
        });

        let file = if file_size > self.resumable_threshold {
            self.upload_resumable(local_path, metadata, mime_type, file_size)
                .await?
        } else {
            self.upload_multipart(local_path, metadata, name, mime_type)
                .await?
        };

        debug!("Uploaded {} as {}", name, file.id);
        Ok(file)
    }

    async fn create_folder(&self, name: &str, parent_id: &str) -> Result<RemoteFile> {
        let token = self.access_token().await?;

        let metadata = serde_json::json!({
            "name": name,
            "mimeType": FOLDER_MIME_TYPE,
            "parents": [parent_id]
        });

        let response = self
            .http
            .post(format!("{}/files", self.api_base))
            .bearer_auth(&token)
            .query(&[("supportsAllDrives", "true"), ("fields", FILE_FIELDS)])
            .json(&metadata)
            .send()
            .await?;

        let folder: RemoteFile = check_response(response).await?.json().await?;
        debug!("Created folder {} as {}", name, folder.id);
        Ok(folder)
    }

    async fn list_folder_contents(&self, folder_id: &str) -> Result<Vec<RemoteFile>> {
        let token = self.access_token().await?;
        let query = folder_contents_query(folder_id);
        let fields = format!("nextPageToken, files({})", FILE_FIELDS);
        let mut all_files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .http
                .get(format!("{}/files", self.api_base))
                .bearer_auth(&token)
                .query(&[
                    ("q", query.as_str()),
                    ("includeItemsFromAllDrives", "true"),
                    ("supportsAllDrives", "true"),
                    ("fields", fields.as_str()),
                ]);

            if let Some(ref token) = page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let response = check_response(request.send().await?).await?;
            let list_response: FileListResponse = response.json().await?;
            all_files.extend(list_response.files);

            match list_response.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!("Listed {} files under {}", all_files.len(), folder_id);
        Ok(all_files)
    }

    async fn upload_dated_data_file(&self, local_path: &Path) -> Result<RemoteFile> {
        let name = data_file_name(Local::now().naive_local());
        self.upload_file(local_path, &name, CSV_MIME_TYPE, &self.default_folder_id)
            .await
    }
}

/// Turn a non-success response into an `ApiError`, decoding Google error bodies.
async fn check_response(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_body = response.text().await.unwrap_or_default();
    if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(&error_body) {
        return Err(DriveError::ApiError {
            status: api_error.error.code,
            message: api_error.error.message,
        });
    }
    Err(DriveError::ApiError {
        status: status.as_u16(),
        message: error_body,
    })
}
