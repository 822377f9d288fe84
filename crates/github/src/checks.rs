use anyhow::{Context, Result};
use octocrab::{Octocrab, models::CheckRunId};
use serde::{Deserialize, Serialize};

/// Name shown for the check runs this app creates.
pub const CHECK_RUN_NAME: &str = "Ch Ch Check It Out Now";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckRunStatus {
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckRunConclusion {
    Success,
}

#[derive(Debug, Serialize)]
struct CreateCheckRun<'a> {
    name: &'a str,
    head_sha: &'a str,
}

#[derive(Debug, Serialize)]
pub struct CheckRunUpdate {
    pub status: CheckRunStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conclusion: Option<CheckRunConclusion>,
}

#[derive(Debug, Deserialize)]
struct CheckRunResponse {
    id: CheckRunId,
}

pub async fn create_check_run(
    client: &Octocrab,
    repository: &str,
    head_sha: &str,
) -> Result<CheckRunId> {
    let response: CheckRunResponse = client
        .post(
            format!("/repos/{repository}/check-runs"),
            Some(&CreateCheckRun { name: CHECK_RUN_NAME, head_sha }),
        )
        .await
        .with_context(|| format!("Failed to create check run for {repository}@{head_sha}"))?;
    tracing::info!("Created check run {} for {}@{}", response.id, repository, head_sha);
    Ok(response.id)
}

pub async fn update_check_run(
    client: &Octocrab,
    repository: &str,
    check_run_id: CheckRunId,
    update: &CheckRunUpdate,
) -> Result<()> {
    let _: CheckRunResponse = client
        .patch(format!("/repos/{repository}/check-runs/{check_run_id}"), Some(update))
        .await
        .with_context(|| {
            format!("Failed to update check run {check_run_id} in {repository} to {update:?}")
        })?;
    tracing::info!("Updated check run {} in {} to {:?}", check_run_id, repository, update);
    Ok(())
}

/// Mark a check run as in progress, then as successfully completed.
pub async fn run_check_run(
    client: &Octocrab,
    repository: &str,
    check_run_id: CheckRunId,
) -> Result<()> {
    update_check_run(client, repository, check_run_id, &CheckRunUpdate {
        status: CheckRunStatus::InProgress,
        conclusion: None,
    })
    .await?;

    // Hook for real CI work; nothing runs between the two transitions yet.

    update_check_run(client, repository, check_run_id, &CheckRunUpdate {
        status: CheckRunStatus::Completed,
        conclusion: Some(CheckRunConclusion::Success),
    })
    .await
}
