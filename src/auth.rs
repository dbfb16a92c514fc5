//! OAuth2 installed-application authorization for Google APIs.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{Duration, Utc};
use reqwest::{Client, Url};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{DriveError, Result};
use crate::models::{ClientSecrets, ClientSecretsFile, StoredCredential, TokenResponse};
use crate::receiver::{CodeReceiver, LocalServerReceiver};
use crate::token_store::FileTokenStore;

/// Google Drive API scope.
pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";

/// Key under which the credential is stored.
pub const USER_ID: &str = "user";

/// Seconds before expiry at which a cached token is no longer used.
const EXPIRY_MARGIN_SECS: i64 = 60;

impl ClientSecrets {
    /// Load client secrets from a Google Cloud console JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => {
                DriveError::AuthenticationError(format!("credentials file {:?} not found", path))
            }
            _ => DriveError::AuthenticationError(format!(
                "cannot read credentials file {:?}: {}",
                path, e
            )),
        })?;

        let file: ClientSecretsFile = serde_json::from_str(&content).map_err(|e| {
            DriveError::AuthenticationError(format!("invalid credentials file {:?}: {}", path, e))
        })?;

        file.installed.or(file.web).ok_or_else(|| {
            DriveError::AuthenticationError(format!(
                "credentials file {:?} has neither an `installed` nor a `web` client",
                path
            ))
        })
    }
}

/// Authorizes requests on behalf of the local user.
pub struct Authenticator<R = LocalServerReceiver> {
    credentials_path: PathBuf,
    store: FileTokenStore,
    receiver: R,
    http: Client,
}

impl Authenticator<LocalServerReceiver> {
    /// Authenticator with the loopback receiver described by `config`.
    pub fn from_config(config: &Config) -> Self {
        let receiver = LocalServerReceiver::new(config.callback_port, config.auth_timeout())
            .with_browser(config.open_browser);
        Self::new(config, receiver)
    }
}

impl<R: CodeReceiver> Authenticator<R> {
    pub fn new(config: &Config, receiver: R) -> Self {
        Self {
            credentials_path: config.credentials_file_path.clone(),
            store: FileTokenStore::new(&config.tokens_directory_path),
            receiver,
            http: Client::new(),
        }
    }

    pub fn receiver(&self) -> &R {
        &self.receiver
    }

    /// Return a usable credential, refreshing or re-authorizing as needed.
    pub async fn authorize(&self) -> Result<StoredCredential> {
        let secrets = ClientSecrets::from_file(&self.credentials_path)?;

        if let Some(stored) = self.store.load(USER_ID)? {
            if !stored.grants(DRIVE_SCOPE) {
                info!("Stored credential lacks the Drive scope, requesting a new authorization");
            } else if stored.is_valid_at(Utc::now(), Duration::seconds(EXPIRY_MARGIN_SECS)) {
                debug!("Using cached credential");
                return Ok(stored);
            } else if let Some(refresh_token) = stored.refresh_token.as_deref() {
                match self.refresh(&secrets, refresh_token).await {
                    Ok(credential) => {
                        self.store.save(USER_ID, &credential)?;
                        return Ok(credential);
                    }
                    Err(e) => warn!("Token refresh failed, requesting a new authorization: {}", e),
                }
            }
        }

        let credential = self.authorize_interactively(&secrets).await?;
        self.store.save(USER_ID, &credential)?;
        Ok(credential)
    }

    /// Exchange a refresh token for a new access token.
    async fn refresh(
        &self,
        secrets: &ClientSecrets,
        refresh_token: &str,
    ) -> Result<StoredCredential> {
        debug!("Refreshing access token");
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", secrets.client_id.as_str()),
            ("client_secret", secrets.client_secret.as_str()),
        ];

        let mut credential = self.request_token(secrets, &params).await?;
        if credential.refresh_token.is_none() {
            credential.refresh_token = Some(refresh_token.to_string());
        }
        Ok(credential)
    }

    async fn authorize_interactively(&self, secrets: &ClientSecrets) -> Result<StoredCredential> {
        let redirect_uri = self.receiver.redirect_uri();
        let url = authorization_url(secrets, &redirect_uri)?;
        let code = self.receiver.receive_code(url.as_str()).await?;

        let params = [
            ("grant_type", "authorization_code"),
            ("code", code.as_str()),
            ("redirect_uri", redirect_uri.as_str()),
            ("client_id", secrets.client_id.as_str()),
            ("client_secret", secrets.client_secret.as_str()),
        ];

        let credential = self.request_token(secrets, &params).await?;
        info!("Authorization granted");
        Ok(credential)
    }

    async fn request_token(
        &self,
        secrets: &ClientSecrets,
        params: &[(&str, &str)],
    ) -> Result<StoredCredential> {
        let response = self
            .http
            .post(&secrets.token_uri)
            .form(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DriveError::AuthenticationError(format!(
                "token endpoint returned {}: {}",
                status, body
            )));
        }

        let token_response: TokenResponse = response.json().await?;
        let mut credential = StoredCredential::from_response(token_response, Utc::now());
        if credential.scope.is_none() {
            credential.scope = Some(DRIVE_SCOPE.to_string());
        }
        Ok(credential)
    }
}

/// Consent page URL for the Drive scope with offline access.
pub fn authorization_url(secrets: &ClientSecrets, redirect_uri: &str) -> Result<Url> {
    Url::parse_with_params(
        &secrets.auth_uri,
        &[
            ("client_id", secrets.client_id.as_str()),
            ("redirect_uri", redirect_uri),
            ("response_type", "code"),
            ("scope", DRIVE_SCOPE),
            ("access_type", "offline"),
        ],
    )
    .map_err(|e| DriveError::AuthenticationError(format!("invalid auth_uri: {}", e)))
}
