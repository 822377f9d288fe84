use octocrab::models::{AppId, CheckRunId, InstallationId};

use crate::events::{CheckRunAction, CheckSuiteAction, EventKind, EventPayload, WebhookEvent};

/// Work planned for a webhook event. Every variant is performed with an
/// installation-scoped client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Create a new check run for a commit.
    CreateCheckRun { installation_id: InstallationId, repository: String, head_sha: String },
    /// Move an existing check run to in progress, then to completed.
    RunCheckRun { installation_id: InstallationId, repository: String, check_run_id: CheckRunId },
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("payload has no installation ID")]
    MissingInstallation,
    #[error("payload has no repository")]
    MissingRepository,
    #[error("payload has no head SHA")]
    MissingHeadSha,
    #[error("payload has no check run")]
    MissingCheckRun,
}

impl Action {
    /// Decide what to do with an event. `Ok(None)` means the event is ignored.
    pub fn plan(event: &WebhookEvent, app_id: AppId) -> Result<Option<Self>, PayloadError> {
        let payload = &event.payload;
        match &event.kind {
            EventKind::CheckSuite(CheckSuiteAction::Requested | CheckSuiteAction::Rerequested) => {
                Self::create_check_run(payload).map(Some)
            }
            EventKind::CheckSuite(
                CheckSuiteAction::Completed | CheckSuiteAction::Other(_),
            ) => Ok(None),
            EventKind::CheckRun(action) => {
                let check_run = payload.check_run.as_ref().ok_or(PayloadError::MissingCheckRun)?;
                // Check runs belonging to other apps are delivered too
                if check_run.app.as_ref().map(|app| app.id) != Some(app_id) {
                    return Ok(None);
                }
                match action {
                    CheckRunAction::Created => Ok(Some(Self::RunCheckRun {
                        installation_id: installation_id(payload)?,
                        repository: repository(payload)?,
                        check_run_id: check_run.id,
                    })),
                    CheckRunAction::Rerequested => Self::create_check_run(payload).map(Some),
                    CheckRunAction::RequestedAction
                    | CheckRunAction::Completed
                    | CheckRunAction::Other(_) => Ok(None),
                }
            }
            EventKind::Unhandled(_) => Ok(None),
        }
    }

    fn create_check_run(payload: &EventPayload) -> Result<Self, PayloadError> {
        Ok(Self::CreateCheckRun {
            installation_id: installation_id(payload)?,
            repository: repository(payload)?,
            head_sha: payload.head_sha().ok_or(PayloadError::MissingHeadSha)?.to_string(),
        })
    }

    pub fn installation_id(&self) -> InstallationId {
        match self {
            Self::CreateCheckRun { installation_id, .. }
            | Self::RunCheckRun { installation_id, .. } => *installation_id,
        }
    }

    pub fn repository(&self) -> &str {
        match self {
            Self::CreateCheckRun { repository, .. } | Self::RunCheckRun { repository, .. } => {
                repository
            }
        }
    }
}

fn installation_id(payload: &EventPayload) -> Result<InstallationId, PayloadError> {
    payload.installation_id().ok_or(PayloadError::MissingInstallation)
}

fn repository(payload: &EventPayload) -> Result<String, PayloadError> {
    payload.repository_name().map(str::to_string).ok_or(PayloadError::MissingRepository)
}
