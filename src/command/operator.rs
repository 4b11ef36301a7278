//! # Operator Console
//!
//! Line commands typed by the operator:
//!
//! ```text
//! mode <NAME>        change flight mode
//! arm                arm the vehicle
//! disarm             disarm the vehicle
//! goto <lat> <lon>   recenter the map
//! help               list commands
//! ```

use std::str::FromStr;
use tokio::task::JoinHandle;
use tracing::debug;

use super::{Command, CommandGateway};
use crate::stream::StreamDispatcher;
use crate::telemetry::TrailPoint;

/// Console help text
pub const HELP_TEXT: &str = "commands: mode <NAME> | arm | disarm | goto <lat> <lon> | help";

/// A parsed console line
#[derive(Debug, Clone, PartialEq)]
pub enum OperatorAction {
    /// Send a command to the controller
    Send(Command),
    /// Recenter the map view
    Goto(TrailPoint),
    Help,
}

/// Why a console line was rejected; shown on the status line
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseActionError {
    #[error("empty command")]
    Empty,

    #[error("unknown command '{0}'")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("invalid coordinate '{0}'")]
    InvalidCoordinate(String),
}

impl ParseActionError {
    /// Status line text for this rejection
    pub fn status_text(&self) -> String {
        format!("⚠️ {}", self)
    }
}

fn coordinate(token: &str, limit: f64) -> Result<f64, ParseActionError> {
    token
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && v.abs() <= limit)
        .ok_or_else(|| ParseActionError::InvalidCoordinate(token.to_string()))
}

impl FromStr for OperatorAction {
    type Err = ParseActionError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut tokens = line.split_whitespace();
        let Some(verb) = tokens.next() else {
            return Err(ParseActionError::Empty);
        };
        let args: Vec<&str> = tokens.collect();

        match (verb.to_ascii_lowercase().as_str(), args.as_slice()) {
            ("mode", [name]) => Ok(OperatorAction::Send(Command::SetMode(name.to_ascii_uppercase()))),
            ("mode", _) => Err(ParseActionError::Usage("mode <NAME>")),
            ("arm", []) => Ok(OperatorAction::Send(Command::Arm(true))),
            ("disarm", []) => Ok(OperatorAction::Send(Command::Arm(false))),
            ("arm", _) | ("disarm", _) => Err(ParseActionError::Usage("arm | disarm")),
            ("goto", [lat, lon]) => {
                let lat = coordinate(lat, 90.0)?;
                let lon = coordinate(lon, 180.0)?;
                Ok(OperatorAction::Goto(TrailPoint::new(lat, lon)))
            }
            ("goto", _) => Err(ParseActionError::Usage("goto <lat> <lon>")),
            ("help", _) | ("?", _) => Ok(OperatorAction::Help),
            (other, _) => Err(ParseActionError::Unknown(other.to_string())),
        }
    }
}

/// Applies operator lines to the command gateway and the map view
#[derive(Debug, Clone)]
pub struct OperatorConsole {
    gateway: CommandGateway,
    goto_zoom: u8,
}

impl OperatorConsole {
    pub fn new(gateway: CommandGateway, goto_zoom: u8) -> Self {
        Self { gateway, goto_zoom }
    }

    /// Parse and apply one console line.
    ///
    /// Blank lines are ignored; rejected lines are reported on the status
    /// line.
    pub fn handle_line(&self, line: &str, dispatcher: &mut StreamDispatcher) -> Option<JoinHandle<bool>> {
        if line.trim().is_empty() {
            return None;
        }
        match line.parse::<OperatorAction>() {
            Ok(action) => self.apply(action, dispatcher),
            Err(e) => {
                self.gateway.status().set_status_text(&e.status_text());
                None
            }
        }
    }

    /// Apply a parsed action.
    ///
    /// Commands are spawned onto the runtime and the handle returned; the
    /// caller goes straight back to projecting stream events while the
    /// acknowledgement is pending. Must be called inside a tokio runtime.
    pub fn apply(&self, action: OperatorAction, dispatcher: &mut StreamDispatcher) -> Option<JoinHandle<bool>> {
        match action {
            OperatorAction::Send(command) => {
                debug!("Operator command {:?}", command);
                let gateway = self.gateway.clone();
                Some(tokio::spawn(async move { gateway.send(command).await }))
            }
            OperatorAction::Goto(point) => {
                dispatcher.center_view(point, self.goto_zoom);
                None
            }
            OperatorAction::Help => {
                self.gateway.status().set_status_text(HELP_TEXT);
                None
            }
        }
    }
}
