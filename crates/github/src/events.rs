//! Typed view of the webhook payloads this app reacts to.
//!
//! Only the fields the dispatcher reads are modelled. Every nested object is
//! optional, since which ones are present depends on the event kind.

use std::fmt;

use octocrab::models::{AppId, CheckRunId, InstallationId};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventPayload {
    pub action: Option<String>,
    pub installation: Option<EventInstallation>,
    pub repository: Option<EventRepository>,
    pub check_run: Option<EventCheckRun>,
    pub check_suite: Option<EventCheckSuite>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventInstallation {
    pub id: InstallationId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventRepository {
    pub full_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventCheckRun {
    pub id: CheckRunId,
    pub head_sha: Option<String>,
    pub app: Option<EventApp>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventCheckSuite {
    pub head_sha: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventApp {
    pub id: AppId,
}

impl EventPayload {
    /// Head commit of the event. A `check_run` object takes precedence over
    /// `check_suite` whenever it is present.
    pub fn head_sha(&self) -> Option<&str> {
        match &self.check_run {
            Some(check_run) => check_run.head_sha.as_deref(),
            None => self.check_suite.as_ref().and_then(|s| s.head_sha.as_deref()),
        }
    }

    pub fn repository_name(&self) -> Option<&str> {
        self.repository.as_ref().map(|r| r.full_name.as_str())
    }

    pub fn installation_id(&self) -> Option<InstallationId> {
        self.installation.as_ref().map(|i| i.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckSuiteAction {
    Requested,
    Rerequested,
    Completed,
    Other(String),
}

impl From<Option<&str>> for CheckSuiteAction {
    fn from(action: Option<&str>) -> Self {
        match action {
            Some("requested") => Self::Requested,
            Some("rerequested") => Self::Rerequested,
            Some("completed") => Self::Completed,
            other => Self::Other(other.unwrap_or_default().to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckRunAction {
    Created,
    Rerequested,
    RequestedAction,
    Completed,
    Other(String),
}

impl From<Option<&str>> for CheckRunAction {
    fn from(action: Option<&str>) -> Self {
        match action {
            Some("created") => Self::Created,
            Some("rerequested") => Self::Rerequested,
            Some("requested_action") => Self::RequestedAction,
            Some("completed") => Self::Completed,
            other => Self::Other(other.unwrap_or_default().to_string()),
        }
    }
}

/// Event kind from the `X-GitHub-Event` header, with the payload action
/// resolved for the kinds that are dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    CheckSuite(CheckSuiteAction),
    CheckRun(CheckRunAction),
    Unhandled(String),
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CheckSuite(_) => f.write_str("check_suite"),
            Self::CheckRun(_) => f.write_str("check_run"),
            Self::Unhandled(kind) => f.write_str(kind),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WebhookEvent {
    pub kind: EventKind,
    pub payload: EventPayload,
}

impl WebhookEvent {
    pub fn try_from_header_and_body(
        header: &str,
        body: &[u8],
    ) -> Result<Self, serde_json::Error> {
        let payload: EventPayload = serde_json::from_slice(body)?;
        let action = payload.action.as_deref();
        let kind = match header {
            "check_suite" => EventKind::CheckSuite(action.into()),
            "check_run" => EventKind::CheckRun(action.into()),
            other => EventKind::Unhandled(other.to_string()),
        };
        Ok(Self { kind, payload })
    }

    /// Payload action for logging, `-` when the event has none.
    pub fn action(&self) -> &str { self.payload.action.as_deref().unwrap_or("-") }
}
