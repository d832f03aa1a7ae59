use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};

use crate::error::Result;
use crate::models::{InviteRequest, InviteResponse};
use crate::state::AppState;

/// Invite routes
pub fn invite_routes() -> Router<AppState> {
    Router::new().route("/invite", post(create_invite))
}

/// POST /api/invite - Validate an invite and notify every participant
///
/// Responds 200 once validation passes, whatever the individual delivery
/// outcomes; 400 with a plain-text reason otherwise.
async fn create_invite(
    State(state): State<AppState>,
    payload: std::result::Result<Json<InviteRequest>, JsonRejection>,
) -> Result<Json<InviteResponse>> {
    let Json(request) = payload?;

    tracing::info!(
        sender = %request.sender.email,
        recipients = request.recipients.len(),
        "Invite request received"
    );

    let response = state.dispatcher.handle_invite(&request).await?;
    Ok(Json(response))
}
