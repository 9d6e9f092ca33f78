//! Manual email API

use axum::{Json, Router, extract::State, routing::post};
use serde::Deserialize;

use crate::core::ServerState;
use crate::services::{Mailer, OutgoingEmail};
use crate::utils::validation::{MAX_NOTE_LEN, MAX_SUBJECT_LEN, validate_email, validate_required_text};
use crate::utils::{AppError, AppResponse, AppResult, ok_with_message};

pub fn router() -> Router<ServerState> {
    Router::new().route("/send-email", post(send_email))
}

#[derive(Debug, Deserialize)]
pub struct SendEmailRequest {
    pub email: String,
    pub subject: String,
    pub body: String,
}

/// POST /send-email
///
/// Unlike status notifications this waits for the transport and reports failure.
async fn send_email(
    State(state): State<ServerState>,
    Json(req): Json<SendEmailRequest>,
) -> AppResult<Json<AppResponse<String>>> {
    let to = req.email.trim().to_string();
    validate_email(&to, "email")?;
    validate_required_text(&req.subject, "subject", MAX_SUBJECT_LEN)?;
    validate_required_text(&req.body, "body", MAX_NOTE_LEN)?;

    state
        .mailer
        .send(OutgoingEmail {
            to: to.clone(),
            subject: req.subject,
            text: req.body,
            html: None,
        })
        .await
        .map_err(|e| AppError::internal(format!("Failed to send email to {}: {}", to, e)))?;

    tracing::info!(to = %to, "Email sent");
    Ok(ok_with_message(to, "Email sent"))
}
