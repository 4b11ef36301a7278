//! # Command Module
//!
//! Operator commands sent to the vehicle controller over HTTP.
//!
//! Every command is a single JSON POST answered by an acknowledgement
//! `{ok, message?}`. The result always ends up on the status line; a
//! failed command is never retried and never deduplicated.

pub mod operator;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::CommandConfig;
use crate::error::{GroundLinkError, Result};
use crate::render::StatusDisplay;

pub use operator::{OperatorAction, OperatorConsole};

/// Status text when a command fails without a server message
pub const GENERIC_FAILURE_TEXT: &str = "⚠️ Command failed";

/// An operator command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Change flight mode, e.g. `GUIDED`
    SetMode(String),
    /// Arm (`true`) or disarm (`false`)
    Arm(bool),
}

impl Command {
    /// Request body as posted to the controller
    pub fn body(&self) -> Value {
        match self {
            Command::SetMode(mode) => json!({ "mode": mode }),
            Command::Arm(arm) => json!({ "arm": arm }),
        }
    }

    /// Status text shown when the controller accepts the command
    pub fn success_text(&self) -> String {
        match self {
            Command::SetMode(mode) => format!("✅ Mode -> {}", mode),
            Command::Arm(true) => "✅ ARM sent".to_string(),
            Command::Arm(false) => "✅ DISARM sent".to_string(),
        }
    }
}

/// Controller acknowledgement
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Acknowledgement {
    pub ok: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl Acknowledgement {
    /// Status text for this acknowledgement of `command`
    pub fn status_text(&self, command: &Command) -> String {
        if self.ok {
            return command.success_text();
        }
        match self.message.as_deref().map(str::trim) {
            Some(message) if !message.is_empty() => format!("⚠️ {}", message),
            _ => GENERIC_FAILURE_TEXT.to_string(),
        }
    }
}

/// Request/acknowledgement channel to the controller
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandClient: Send + Sync {
    /// POST `body` to `path` and decode the acknowledgement.
    ///
    /// # Errors
    ///
    /// Returns error if the request cannot be delivered or the reply is
    /// not an acknowledgement.
    async fn post_json(&self, path: &str, body: Value) -> Result<Acknowledgement>;
}

/// `reqwest` client for the controller's HTTP API
#[derive(Debug, Clone)]
pub struct HttpCommandClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCommandClient {
    /// Build a client with the configured base URL and timeout.
    ///
    /// # Errors
    ///
    /// Returns error if the TLS backend cannot be initialised.
    pub fn new(config: &CommandConfig) -> Result<Self> {
        let timeout = Duration::from_millis(config.timeout_ms);
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| GroundLinkError::Command(format!("build client failed: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn classify_reqwest_error(e: &reqwest::Error) -> &'static str {
    if e.is_timeout() {
        "timeout"
    } else if e.is_connect() {
        "connect failed"
    } else if e.is_request() {
        "request error"
    } else if e.is_body() {
        "body error"
    } else if e.is_decode() {
        "decode error"
    } else {
        "unknown"
    }
}

#[async_trait]
impl CommandClient for HttpCommandClient {
    async fn post_json(&self, path: &str, body: Value) -> Result<Acknowledgement> {
        let url = self.url(path);
        debug!("POST {} {}", url, body);

        let resp = self.client.post(&url).json(&body).send().await.map_err(|e| {
            GroundLinkError::Command(format!("send failed: {} | kind={}", e, classify_reqwest_error(&e)))
        })?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| GroundLinkError::Command(format!("read body failed: {}", e)))?;

        // Rejections come back as 4xx with an acknowledgement body
        match serde_json::from_str::<Acknowledgement>(&text) {
            Ok(ack) => Ok(ack),
            Err(_) if !status.is_success() => {
                Err(GroundLinkError::Command(format!("HTTP {}", status)))
            }
            Err(e) => Err(GroundLinkError::Command(format!("invalid acknowledgement: {}", e))),
        }
    }
}

/// Sends commands and reports each outcome on the status line.
///
/// Stateless apart from its configuration; cheap to clone into a task per
/// command.
#[derive(Clone)]
pub struct CommandGateway {
    client: Arc<dyn CommandClient>,
    status: Arc<dyn StatusDisplay>,
    mode_path: String,
    arm_path: String,
}

impl std::fmt::Debug for CommandGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandGateway")
            .field("mode_path", &self.mode_path)
            .field("arm_path", &self.arm_path)
            .finish_non_exhaustive()
    }
}

impl CommandGateway {
    pub fn new(
        client: Arc<dyn CommandClient>,
        status: Arc<dyn StatusDisplay>,
        config: &CommandConfig,
    ) -> Self {
        Self {
            client,
            status,
            mode_path: config.mode_path.clone(),
            arm_path: config.arm_path.clone(),
        }
    }

    /// Request a flight-mode change.
    pub async fn set_mode(&self, mode: &str) -> bool {
        self.send(Command::SetMode(mode.to_string())).await
    }

    /// Request arm (`true`) or disarm (`false`).
    ///
    /// Sent regardless of the armed state last seen in telemetry.
    pub async fn set_armed(&self, arm: bool) -> bool {
        self.send(Command::Arm(arm)).await
    }

    /// Status line shared with the stream dispatcher
    pub fn status(&self) -> &dyn StatusDisplay {
        self.status.as_ref()
    }

    /// Send `command` and show the outcome.
    ///
    /// Returns `true` if the controller acknowledged with `ok`.
    pub async fn send(&self, command: Command) -> bool {
        let path = match command {
            Command::SetMode(_) => &self.mode_path,
            Command::Arm(_) => &self.arm_path,
        };

        let (ok, text) = match self.client.post_json(path, command.body()).await {
            Ok(ack) => {
                if ack.ok {
                    info!("Command {:?} acknowledged", command);
                } else {
                    warn!("Command {:?} rejected: {:?}", command, ack.message);
                }
                (ack.ok, ack.status_text(&command))
            }
            Err(e) => {
                warn!("Command {:?} failed: {}", command, e);
                (false, GENERIC_FAILURE_TEXT.to_string())
            }
        };

        self.status.set_status_text(&text);
        ok
    }
}
