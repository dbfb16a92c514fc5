//! Receivers for the OAuth2 authorization code.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::Query;
use axum::response::Html;
use axum::{Extension, Router};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex};
use tracing::{debug, info, warn};

use crate::error::{DriveError, Result};

/// Path the browser is redirected to after consent.
pub const CALLBACK_PATH: &str = "/Callback";

/// How long the listener may keep finishing responses after the code arrived.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

const SUCCESS_PAGE: &str = "<html><head><title>OAuth 2.0 Authentication Token Received</title></head>\
<body>Received verification code. You may now close this window.</body></html>";

const FAILURE_PAGE: &str = "<html><head><title>OAuth 2.0 Authentication Failed</title></head>\
<body>Authorization was not granted. You may now close this window.</body></html>";

/// Obtains the authorization code once the user has been sent to the consent page.
#[async_trait]
pub trait CodeReceiver: Send + Sync {
    /// Redirect URI registered in the authorization request.
    fn redirect_uri(&self) -> String;

    /// Present `authorization_url` to the user and wait for the resulting code.
    async fn receive_code(&self, authorization_url: &str) -> Result<String>;
}

/// Query string of the redirect back from the consent page.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
}

impl CallbackParams {
    /// The authorization code, or the reason none was granted.
    pub fn into_code(self) -> Result<String> {
        match (self.code, self.error) {
            (_, Some(error)) => Err(DriveError::AuthenticationError(format!(
                "authorization denied: {}",
                error
            ))),
            (Some(code), None) if !code.is_empty() => Ok(code),
            _ => Err(DriveError::AuthenticationError(
                "callback did not carry an authorization code".to_string(),
            )),
        }
    }
}

type CodeSender = Arc<Mutex<Option<oneshot::Sender<Result<String>>>>>;

async fn callback_handler(
    Extension(sender): Extension<CodeSender>,
    Query(params): Query<CallbackParams>,
) -> Html<&'static str> {
    let outcome = params.into_code();
    let page = if outcome.is_ok() { SUCCESS_PAGE } else { FAILURE_PAGE };

    match sender.lock().await.take() {
        Some(tx) => {
            if tx.send(outcome).is_err() {
                debug!("Callback arrived after the wait was abandoned");
            }
        }
        None => debug!("Ignoring repeated callback"),
    }

    Html(page)
}

fn callback_router(sender: CodeSender) -> Router {
    Router::new()
        .route(CALLBACK_PATH, axum::routing::get(callback_handler))
        .layer(Extension(sender))
}

/// Receives the code on a loopback HTTP listener.
#[derive(Debug, Clone)]
pub struct LocalServerReceiver {
    port: u16,
    timeout: Duration,
    open_browser: bool,
}

impl LocalServerReceiver {
    pub fn new(port: u16, timeout: Duration) -> Self {
        Self {
            port,
            timeout,
            open_browser: true,
        }
    }

    /// Whether the consent page is opened in the system browser.
    pub fn with_browser(mut self, open_browser: bool) -> Self {
        self.open_browser = open_browser;
        self
    }

    fn present(&self, authorization_url: &str) {
        if self.open_browser {
            match webbrowser::open(authorization_url) {
                Ok(()) => {
                    info!("Opened the authorization page in the browser");
                    return;
                }
                Err(e) => warn!("Unable to open a browser: {}", e),
            }
        }

        eprintln!("Please open the following address in your browser:");
        eprintln!("  {}", authorization_url);
    }
}

#[async_trait]
impl CodeReceiver for LocalServerReceiver {
    fn redirect_uri(&self) -> String {
        format!("http://localhost:{}{}", self.port, CALLBACK_PATH)
    }

    async fn receive_code(&self, authorization_url: &str) -> Result<String> {
        let listener = TcpListener::bind(("127.0.0.1", self.port))
            .await
            .map_err(|e| {
                DriveError::AuthenticationError(format!(
                    "cannot listen for the OAuth callback on port {}: {}",
                    self.port, e
                ))
            })?;

        let (code_tx, code_rx) = oneshot::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let app = callback_router(Arc::new(Mutex::new(Some(code_tx))));

        let mut server = tokio::spawn(async move {
            let served = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await;
            if let Err(e) = served {
                warn!("Callback listener failed: {}", e);
            }
        });

        info!("Waiting for authorization on {}", self.redirect_uri());
        self.present(authorization_url);

        let outcome = tokio::time::timeout(self.timeout, code_rx).await;

        shutdown_tx.send(()).ok();
        if tokio::time::timeout(SHUTDOWN_GRACE, &mut server).await.is_err() {
            server.abort();
        }

        match outcome {
            Ok(Ok(received)) => received,
            Ok(Err(_)) => Err(DriveError::AuthenticationError(
                "callback listener stopped before authorization".to_string(),
            )),
            Err(_) => Err(DriveError::AuthenticationError(format!(
                "no authorization received within {}s",
                self.timeout.as_secs()
            ))),
        }
    }
}
