//! drive_service - A CLI tool for managing files in Google Drive.
//!
//! This library provides functionality to:
//! - List the files of a Drive folder as a table
//! - Upload a file, or a dated CSV data file to a default folder
//! - Create folders
//!
//! Requests are authorized with the OAuth2 installed-application flow; the
//! resulting credential is cached on disk and refreshed when it expires.
//!
//! # Example
//!
//! ```no_run
//! use drive_service::{Authenticator, Config, DriveClient, DriveOperations};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::bundled()?;
//!     let client = DriveClient::new(&config, Authenticator::from_config(&config))?;
//!
//!     for file in client.list_folder_contents(&config.default_folder_id).await? {
//!         println!("{} {}", file.id, file.name);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod folder_ref;
pub mod models;
pub mod presenter;
pub mod receiver;
pub mod token_store;

// Re-exports for convenience
pub use auth::Authenticator;
pub use cli::{Cli, CommandRequest};
pub use client::{DriveClient, DriveOperations};
pub use config::Config;
pub use dispatch::dispatch;
pub use error::{DriveError, Result};
pub use folder_ref::FolderRef;
pub use models::RemoteFile;
pub use receiver::{CodeReceiver, LocalServerReceiver};
