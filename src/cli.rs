//! Command-line surface and validation of the requested operation.

use std::path::PathBuf;

use clap::{ArgAction, CommandFactory, Parser};
use tracing::warn;

use crate::error::{DriveError, Result};
use crate::folder_ref::{extract_folder_id, FolderRef};
use crate::models::DEFAULT_MIME_TYPE;

/// List, upload and create files in Google Drive.
#[derive(Parser, Debug)]
#[command(name = "drive_service")]
#[command(author, version, about, long_about = None)]
#[command(disable_help_flag = true)]
pub struct Cli {
    /// List files in this folder (ID, folder URL, or `default`).
    #[arg(long, value_name = "FOLDER")]
    pub list: Option<String>,

    /// Upload a file to the given folder.
    #[arg(long)]
    pub upload: bool,

    /// Upload a data file to the default folder.
    #[arg(long = "upload_data")]
    pub upload_data: bool,

    /// Create a folder in Google Drive.
    #[arg(long = "create_folder")]
    pub create_folder: bool,

    /// Path to the upload file.
    #[arg(long = "i", value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// MIME type of the upload file.
    #[arg(long = "type", value_name = "MIME_TYPE")]
    pub mime_type: Option<String>,

    /// Name in Google Drive.
    #[arg(long)]
    pub name: Option<String>,

    /// Parent folder ID or URL.
    #[arg(long, value_name = "FOLDER")]
    pub parent: Option<String>,

    /// Print help message.
    #[arg(long, action = ArgAction::SetTrue)]
    pub help: bool,

    /// Configuration file replacing the bundled settings.
    #[arg(long, env = "DRIVE_SERVICE_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log debug output.
    #[arg(long, short)]
    pub verbose: bool,
}

impl Cli {
    /// Rendered usage text.
    pub fn usage() -> String {
        Self::command().render_help().to_string()
    }
}

/// The single operation one invocation performs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandRequest {
    Help,
    List {
        folder: FolderRef,
    },
    Upload {
        path: PathBuf,
        name: String,
        mime_type: String,
        parent: String,
    },
    UploadData {
        path: PathBuf,
    },
    CreateFolder {
        name: String,
        parent: String,
    },
}

impl CommandRequest {
    /// Pick the operation by priority and check its parameters.
    ///
    /// Priority is `help`, `list`, `upload`, `upload_data`, `create_folder`;
    /// flags of lower-priority operations are ignored.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        if cli.help {
            return Ok(Self::Help);
        }

        if let Some(folder) = &cli.list {
            return Ok(Self::List {
                folder: FolderRef::parse(folder)?,
            });
        }

        if cli.upload {
            let (Some(path), Some(name), Some(parent)) = (&cli.input, &cli.name, &cli.parent)
            else {
                return Err(DriveError::UsageError(
                    "Parameters are not enough. Required 'i', 'name' and 'parent'.".to_string(),
                ));
            };

            let mime_type = match &cli.mime_type {
                Some(mime_type) => mime_type.clone(),
                None => {
                    warn!("No file type given, uploading as {}", DEFAULT_MIME_TYPE);
                    DEFAULT_MIME_TYPE.to_string()
                }
            };

            return Ok(Self::Upload {
                path: path.clone(),
                name: name.clone(),
                mime_type,
                parent: extract_folder_id(parent)?,
            });
        }

        if cli.upload_data {
            let Some(path) = &cli.input else {
                return Err(DriveError::UsageError(
                    "Parameters are not enough. Required 'i'.".to_string(),
                ));
            };
            return Ok(Self::UploadData { path: path.clone() });
        }

        if cli.create_folder {
            let (Some(name), Some(parent)) = (&cli.name, &cli.parent) else {
                return Err(DriveError::UsageError(
                    "Parameters are not enough. Required 'name' and 'parent'.".to_string(),
                ));
            };
            return Ok(Self::CreateFolder {
                name: name.clone(),
                parent: extract_folder_id(parent)?,
            });
        }

        Err(DriveError::UsageError(
            "No operation given. Use one of --list, --upload, --upload_data, --create_folder."
                .to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CommandRequest> {
        let cli = Cli::try_parse_from(std::iter::once("drive_service").chain(args.iter().copied()))
            .expect("arguments should parse");
        CommandRequest::from_cli(&cli)
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_help_wins_over_list() {
        assert_eq!(parse(&["--list", "abc", "--help"]).unwrap(), CommandRequest::Help);
        assert_eq!(parse(&["--help", "--upload"]).unwrap(), CommandRequest::Help);
    }

    #[test]
    fn test_list_wins_over_upload() {
        let request = parse(&["--upload", "--list", "default"]).unwrap();
        assert_eq!(
            request,
            CommandRequest::List {
                folder: FolderRef::Default
            }
        );
    }

    #[test]
    fn test_list_literal_id() {
        assert_eq!(
            parse(&["--list", "1abcXYZ"]).unwrap(),
            CommandRequest::List {
                folder: FolderRef::Id("1abcXYZ".into())
            }
        );
    }

    #[test]
    fn test_list_blank_value_is_usage_error() {
        let err = parse(&["--list", " "]).unwrap_err();
        assert!(err.is_usage());
    }

    #[test]
    fn test_list_requires_value() {
        let cli = Cli::try_parse_from(["drive_service", "--list"]);
        assert!(cli.is_err());
    }

    #[test]
    fn test_upload_with_type_passes_it_through() {
        let request = parse(&[
            "--upload", "--i", "report.pdf", "--name", "Report", "--type", "application/pdf",
            "--parent", "folder1",
        ])
        .unwrap();

        assert_eq!(
            request,
            CommandRequest::Upload {
                path: PathBuf::from("report.pdf"),
                name: "Report".into(),
                mime_type: "application/pdf".into(),
                parent: "folder1".into(),
            }
        );
    }

    #[test]
    fn test_upload_without_type_uses_octet_stream() {
        let request =
            parse(&["--upload", "--i", "blob.bin", "--name", "blob", "--parent", "folder1"]).unwrap();
        assert!(matches!(
            request,
            CommandRequest::Upload { mime_type, .. } if mime_type == "application/octet-stream"
        ));
    }

    #[test]
    fn test_upload_missing_parameters() {
        for args in [
            &["--upload", "--name", "n", "--parent", "p"][..],
            &["--upload", "--i", "f", "--parent", "p"][..],
            &["--upload", "--i", "f", "--name", "n"][..],
        ] {
            let err = parse(args).unwrap_err();
            assert!(matches!(err, DriveError::UsageError(_)), "{:?}", args);
        }
    }

    #[test]
    fn test_upload_parent_url() {
        let request = parse(&[
            "--upload", "--i", "f", "--name", "n", "--parent",
            "https://drive.google.com/drive/u/1/folders/1U0J1W",
        ])
        .unwrap();
        assert!(matches!(request, CommandRequest::Upload { parent, .. } if parent == "1U0J1W"));
    }

    #[test]
    fn test_upload_data() {
        assert_eq!(
            parse(&["--upload_data", "--i", "out.csv"]).unwrap(),
            CommandRequest::UploadData {
                path: PathBuf::from("out.csv")
            }
        );
        assert!(matches!(
            parse(&["--upload_data"]),
            Err(DriveError::UsageError(_))
        ));
    }

    #[test]
    fn test_create_folder() {
        assert_eq!(
            parse(&["--create_folder", "--name", "reports", "--parent", "root"]).unwrap(),
            CommandRequest::CreateFolder {
                name: "reports".into(),
                parent: "root".into(),
            }
        );
        assert!(matches!(
            parse(&["--create_folder", "--name", "reports"]),
            Err(DriveError::UsageError(_))
        ));
    }

    #[test]
    fn test_no_operation_is_usage_error() {
        assert!(matches!(parse(&[]), Err(DriveError::UsageError(_))));
        assert!(matches!(parse(&["--i", "x.csv"]), Err(DriveError::UsageError(_))));
    }

    #[test]
    fn test_usage_mentions_flags() {
        let usage = Cli::usage();
        for flag in ["--list", "--upload", "--upload_data", "--create_folder", "--i", "--type"] {
            assert!(usage.contains(flag), "missing {}", flag);
        }
    }
}
