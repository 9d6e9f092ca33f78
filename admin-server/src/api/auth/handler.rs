//! Authentication Handlers
//!
//! Handles admin registration, login and token checks

use std::time::Duration;

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::auth::password::{hash_password, verify_password};
use crate::auth::{CaptchaError, CurrentUser, JwtError};
use crate::core::ServerState;
use crate::db::models::{AdminInfo, AdminRegister, LoginRequest, LoginResponse};
use crate::db::repository::AdminRepository;
use crate::security_log;
use crate::utils::validation::{MAX_NAME_LEN, MAX_PASSWORD_LEN, validate_email, validate_required_text};
use crate::utils::{AppResponse, AppResult, ok, ok_with_message};
use crate::AppError;

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 300;

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Deserialize)]
pub struct VerifyTokenRequest {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyTokenResponse {
    pub valid: bool,
    pub admin: AdminInfo,
}

fn admin_info(user: CurrentUser) -> AdminInfo {
    AdminInfo {
        id: user.id,
        name: user.name,
        email: user.email,
    }
}

/// Register a new admin
pub async fn register(
    State(state): State<ServerState>,
    Json(req): Json<AdminRegister>,
) -> AppResult<(StatusCode, Json<AppResponse<AdminInfo>>)> {
    if !state.config.allow_registration {
        return Err(AppError::forbidden("Registration is disabled"));
    }

    let name = req.name.trim().to_string();
    let email = req.email.trim().to_lowercase();
    validate_required_text(&name, "name", MAX_NAME_LEN)?;
    validate_email(&email, "email")?;
    validate_required_text(&req.password, "password", MAX_PASSWORD_LEN)?;
    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let hash = hash_password(&req.password)
        .map_err(|e| AppError::internal(format!("Failed to hash password: {}", e)))?;

    let repo = AdminRepository::new(state.get_db());
    let admin = repo.create(name, email, hash).await?;

    tracing::info!(admin = %admin.name, "Admin registered");
    Ok((
        StatusCode::CREATED,
        ok_with_message(AdminInfo::from(&admin), "Admin registered"),
    ))
}

/// Login handler
///
/// Captcha first, then credentials. Unknown name and wrong password answer the same.
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<AppResponse<LoginResponse>>> {
    if let Err(e) = state.captcha.verify(req.captcha_token.as_deref()).await {
        security_log!("WARN", "captcha_failed", name = req.name.clone(), error = e.to_string());
        return Err(match e {
            CaptchaError::MissingToken | CaptchaError::Rejected(_) => AppError::captcha_failed(),
            CaptchaError::NotConfigured | CaptchaError::Transport(_) => {
                AppError::internal(e.to_string())
            }
        });
    }

    let repo = AdminRepository::new(state.get_db());
    let admin = repo.find_by_login(req.name.trim()).await?;

    // Fixed delay to prevent timing attacks (before checking result)
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    let admin = match admin {
        Some(admin) => admin,
        None => {
            security_log!("WARN", "login_failed", name = req.name.clone(), reason = "not_found");
            return Err(AppError::invalid_credentials());
        }
    };

    // Google-only accounts have no local password
    let Some(hash) = admin.hash_pass.as_deref() else {
        security_log!("WARN", "login_failed", name = req.name.clone(), reason = "no_password");
        return Err(AppError::invalid_credentials());
    };

    let valid = verify_password(&req.password, hash)
        .map_err(|e| AppError::internal(format!("Password verification failed: {}", e)))?;
    if !valid {
        security_log!("WARN", "login_failed", name = req.name.clone(), reason = "bad_password");
        return Err(AppError::invalid_credentials());
    }

    let info = AdminInfo::from(&admin);
    let jwt_service = state.get_jwt_service();
    let token = jwt_service
        .generate_token(&info.id, &info.name, &info.email)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    tracing::info!(admin_id = %info.id, name = %info.name, "Admin logged in");

    Ok(ok(LoginResponse {
        token,
        expires_in: jwt_service.expires_in_seconds(),
        admin: info,
    }))
}

/// Tokens are stateless; the client drops its copy
pub async fn logout() -> Json<AppResponse<bool>> {
    ok_with_message(true, "Logged out")
}

/// Current admin, re-read from the database
pub async fn protected(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<AppResponse<AdminInfo>>> {
    let repo = AdminRepository::new(state.get_db());
    let admin = repo
        .find_by_id(&user.id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Admin {} not found", user.id)))?;
    Ok(ok(AdminInfo::from(&admin)))
}

pub async fn verify_token(
    State(state): State<ServerState>,
    Json(req): Json<VerifyTokenRequest>,
) -> AppResult<Json<AppResponse<VerifyTokenResponse>>> {
    let claims = state
        .get_jwt_service()
        .validate_token(req.token.trim())
        .map_err(|e| match e {
            JwtError::ExpiredToken => AppError::token_expired(),
            other => AppError::invalid_token(other.to_string()),
        })?;

    Ok(ok(VerifyTokenResponse {
        valid: true,
        admin: admin_info(CurrentUser::from(claims)),
    }))
}
