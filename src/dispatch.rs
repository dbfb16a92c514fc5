//! Runs the requested operation against the storage client.

use std::io::Write;

use tracing::info;

use crate::cli::{Cli, CommandRequest};
use crate::client::DriveOperations;
use crate::config::Config;
use crate::error::Result;
use crate::presenter;

/// Perform `request` and print its outcome to `out`.
pub async fn dispatch<D, W>(
    request: &CommandRequest,
    config: &Config,
    drive: &D,
    out: &mut W,
) -> Result<()>
where
    D: DriveOperations + ?Sized,
    W: Write,
{
    match request {
        CommandRequest::Help => {
            write!(out, "{}", Cli::usage())?;
        }
        CommandRequest::List { folder } => {
            let folder_id = folder.resolve(config);
            info!("Listing files under folder {}", folder_id);
            let files = drive.list_folder_contents(folder_id).await?;
            presenter::write_listing(out, folder_id, &files)?;
        }
        CommandRequest::Upload {
            path,
            name,
            mime_type,
            parent,
        } => {
            let file = drive.upload_file(path, name, mime_type, parent).await?;
            presenter::write_file_created(out, &file)?;
        }
        CommandRequest::UploadData { path } => {
            let file = drive.upload_dated_data_file(path).await?;
            presenter::write_file_created(out, &file)?;
        }
        CommandRequest::CreateFolder { name, parent } => {
            let folder = drive.create_folder(name, parent).await?;
            presenter::write_folder_created(out, &folder)?;
        }
    }

    Ok(())
}
