//! Shared fixtures: a temporary config with client secrets and a token cache.

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use chrono::{Duration, Utc};
use drive_service::auth::USER_ID;
use drive_service::models::StoredCredential;
use drive_service::token_store::FileTokenStore;
use drive_service::{Authenticator, Config, DriveClient};
use serde_json::json;
use tempfile::TempDir;

pub const DEFAULT_FOLDER_ID: &str = "defaultFolder42";

pub struct Fixture {
    pub dir: TempDir,
    pub config: Config,
}

impl Fixture {
    /// Config whose client secrets point at `token_uri`.
    pub fn new(token_uri: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let credentials_file_path = dir.path().join("credentials.json");
        let secrets = json!({
            "installed": {
                "client_id": "client-1.apps.googleusercontent.com",
                "client_secret": "secret-1",
                "auth_uri": "https://accounts.example.com/o/oauth2/auth",
                "token_uri": token_uri,
                "redirect_uris": ["http://localhost"]
            }
        });
        fs::write(&credentials_file_path, secrets.to_string()).unwrap();

        let config = Config {
            application_name: "drive_service-test".to_string(),
            tokens_directory_path: dir.path().join("tokens"),
            credentials_file_path,
            default_folder_id: DEFAULT_FOLDER_ID.to_string(),
            callback_port: 0,
            auth_timeout_secs: 1,
            open_browser: false,
        };

        Self { dir, config }
    }

    pub fn store(&self) -> FileTokenStore {
        FileTokenStore::new(&self.config.tokens_directory_path)
    }

    pub fn token_file(&self) -> PathBuf {
        self.config
            .tokens_directory_path
            .join(format!("{}.json", USER_ID))
    }

    /// Cache a credential expiring `expires_in_secs` from now.
    pub fn seed_token(&self, access_token: &str, refresh_token: Option<&str>, expires_in_secs: i64) {
        let credential = StoredCredential {
            access_token: access_token.to_string(),
            refresh_token: refresh_token.map(str::to_string),
            expires_at: Some(Utc::now() + Duration::seconds(expires_in_secs)),
            scope: Some(drive_service::auth::DRIVE_SCOPE.to_string()),
        };
        self.store().save(USER_ID, &credential).unwrap();
    }

    pub fn stored(&self) -> Option<StoredCredential> {
        self.store().load(USER_ID).unwrap()
    }

    /// Client talking to `server_url` with a cached valid token `tok`.
    pub fn client(&self, server_url: &str) -> DriveClient {
        self.seed_token("tok", Some("refresh-1"), 3600);
        DriveClient::new(&self.config, Authenticator::from_config(&self.config))
            .unwrap()
            .with_endpoints(server_url, &format!("{}/upload", server_url))
    }

    /// Write a local file inside the fixture directory.
    pub fn local_file(&self, name: &str, content: &[u8]) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }
}
