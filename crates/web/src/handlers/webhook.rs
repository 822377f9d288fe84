use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use checkbot_core::AppError;
use checkbot_github::{GitHub, dispatch::Action, webhook::GitHubEvent};

/// Verifies, plans and performs a single webhook delivery.
///
/// Credentials are only minted when the event maps to an action, so ignored
/// events never reach the GitHub API.
pub async fn event_handler(
    State(github): State<Arc<GitHub>>,
    GitHubEvent { event }: GitHubEvent,
) -> Result<Response, AppError> {
    let repository = event.payload.repository_name().unwrap_or("[unknown]");
    tracing::info!(
        "Received webhook event {} ({}) from repository {}",
        event.kind,
        event.action(),
        repository
    );

    let action = match Action::plan(&event, github.app_id) {
        Ok(Some(action)) => action,
        Ok(None) => {
            tracing::debug!("Ignoring webhook event {} ({})", event.kind, event.action());
            return Ok((StatusCode::OK, "Event ignored").into_response());
        }
        Err(e) => {
            return Err(AppError::BadRequest(format!(
                "Invalid webhook event {} ({}) from repository {}: {}",
                event.kind,
                event.action(),
                repository,
                e
            )));
        }
    };

    github.perform(&action).await.with_context(|| {
        format!("Failed to handle {} ({}) for repository {}", event.kind, event.action(), repository)
    })?;
    tracing::info!("Handled webhook event {} ({}): {:?}", event.kind, event.action(), action);
    Ok((StatusCode::OK, "Event processed").into_response())
}
