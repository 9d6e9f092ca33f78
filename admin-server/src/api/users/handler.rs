//! User API Handlers
//!
//! Passwords arrive in clear text on the form and are hashed here, before
//! anything reaches the repository.

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};

use crate::api::form::FormData;
use crate::auth::password::hash_password;
use crate::core::ServerState;
use crate::db::models::{AuthType, User, UserCreate, UserUpdate};
use crate::db::repository::UserRepository;
use crate::db::repository::user::{NewUser, UserChanges};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_PASSWORD_LEN, validate_email, validate_required_text,
};
use crate::utils::{AppError, AppResponse, AppResult, ok, ok_with_message};

fn hash(password: Option<String>) -> AppResult<Option<String>> {
    password
        .map(|p| {
            validate_required_text(&p, "password", MAX_PASSWORD_LEN)?;
            hash_password(&p).map_err(|e| AppError::internal(format!("Failed to hash password: {}", e)))
        })
        .transpose()
}

async fn image_url(state: &ServerState, form: &mut FormData) -> AppResult<Option<String>> {
    match form.take_image() {
        Some(file) => Ok(Some(
            state.images.save(file.file_name.as_deref(), file.data).await?,
        )),
        None => Ok(form.text("image")),
    }
}

fn auth_type(form: &FormData) -> AppResult<Option<AuthType>> {
    form.text("authType")
        .map(|raw| raw.parse::<AuthType>().map_err(AppError::validation))
        .transpose()
}

/// GET /users - 获取所有顾客
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<AppResponse<Vec<User>>>> {
    let repo = UserRepository::new(state.get_db());
    Ok(ok(repo.find_all().await?))
}

/// GET /users/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<User>>> {
    let repo = UserRepository::new(state.get_db());
    let user = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {} not found", id)))?;
    Ok(ok(user))
}

/// POST /users
pub async fn create(
    State(state): State<ServerState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<AppResponse<User>>)> {
    let mut form = FormData::from_multipart(multipart).await?;

    let payload = UserCreate {
        name: form.required("name")?,
        email: form.required("email")?.to_lowercase(),
        password: form.text("password"),
        auth_type: auth_type(&form)?.unwrap_or_default(),
        image: image_url(&state, &mut form).await?,
    };
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_email(&payload.email, "email")?;
    if payload.auth_type == AuthType::Local && payload.password.is_none() {
        return Err(AppError::validation("password is required for local accounts"));
    }

    let repo = UserRepository::new(state.get_db());
    let user = repo
        .create(NewUser {
            name: payload.name,
            email: payload.email,
            hash_pass: hash(payload.password)?,
            auth_type: payload.auth_type,
            image: payload.image,
        })
        .await?;

    tracing::info!(user = %user.name, "User created");
    Ok((StatusCode::CREATED, ok_with_message(user, "User created")))
}

/// PUT /users/:id
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> AppResult<Json<AppResponse<User>>> {
    let mut form = FormData::from_multipart(multipart).await?;

    let payload = UserUpdate {
        name: form.text("name"),
        email: form.text("email").map(|e| e.to_lowercase()),
        password: form.text("password"),
        auth_type: auth_type(&form)?,
        image: image_url(&state, &mut form).await?,
    };
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    if let Some(email) = &payload.email {
        validate_email(email, "email")?;
    }

    let repo = UserRepository::new(state.get_db());
    let user = repo
        .update(
            &id,
            UserChanges {
                name: payload.name,
                email: payload.email,
                hash_pass: hash(payload.password)?,
                auth_type: payload.auth_type,
                image: payload.image,
            },
        )
        .await?;
    Ok(ok_with_message(user, "User updated"))
}

/// DELETE /users/:id
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<String>>> {
    let repo = UserRepository::new(state.get_db());
    repo.delete(&id).await?;
    tracing::info!(user_id = %id, "User deleted");
    Ok(ok_with_message(id, "User deleted"))
}
