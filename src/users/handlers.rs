use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::password::{hash_password, is_long_enough},
    error::{ApiJson, AppError},
    state::AppState,
    users::{
        dto::{CreatedUserResponse, MessageResponse, PublicUser, UserListResponse, UserPayload, UserResponse},
        repo::StoreError,
        repo_types::UserChanges,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

/// Reads the leading integer of a path id, ignoring anything after it, so
/// `12abc` is user 12. `Ok(None)` means the number is too large to be any
/// row's id.
fn parse_id(raw: &str) -> Result<Option<i64>, AppError> {
    let trimmed = raw.trim_start();
    let unsigned = trimmed.trim_start_matches(&['+', '-'][..]);
    let sign_len = trimmed.len() - unsigned.len();
    let digits = unsigned.len() - unsigned.trim_start_matches(|c: char| c.is_ascii_digit()).len();

    if sign_len > 1 || digits == 0 {
        warn!(id = %raw, "invalid user id");
        return Err(AppError::Validation("ID user tidak valid"));
    }

    Ok(trimmed[..sign_len + digits].parse::<i64>().ok())
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<UserListResponse>, AppError> {
    const FAILED: &str = "Terjadi kesalahan saat mengambil data user";

    let users = state
        .store
        .list()
        .await
        .map_err(|e| AppError::internal(FAILED, e))?;

    Ok(Json(UserListResponse {
        success: true,
        users: users.into_iter().map(PublicUser::from).collect(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<UserPayload>,
) -> Result<(StatusCode, Json<CreatedUserResponse>), AppError> {
    const FAILED: &str = "Terjadi kesalahan saat membuat user";

    let (Some(email), Some(password)) = (payload.email(), payload.password()) else {
        warn!("missing email or password");
        return Err(AppError::Validation("Email dan password wajib diisi"));
    };

    if !is_long_enough(password) {
        warn!("password too short");
        return Err(AppError::Validation("Password minimal 6 karakter"));
    }

    let role = payload.role_or_default().map_err(|e| {
        warn!(error = %e, "invalid role");
        AppError::Validation("Role tidak valid")
    })?;

    match state.store.find_by_email(email).await {
        Ok(Some(_)) => {
            warn!(email = %email, "email already in use");
            return Err(AppError::Conflict("Email sudah digunakan"));
        }
        Ok(None) => {}
        Err(e) => return Err(AppError::internal(FAILED, e)),
    }

    let hash = hash_password(password).map_err(|e| AppError::internal(FAILED, e))?;

    let user = match state.store.insert(email, &hash, role).await {
        Ok(u) => u,
        Err(StoreError::EmailTaken) => {
            warn!(email = %email, "email taken by a concurrent insert");
            return Err(AppError::Conflict("Email sudah digunakan"));
        }
        Err(e) => return Err(AppError::internal(FAILED, e)),
    };

    info!(user_id = user.id, email = %user.email, role = ?user.role, "user created");
    Ok((
        StatusCode::CREATED,
        Json(CreatedUserResponse {
            success: true,
            user_id: user.id,
            message: "User berhasil dibuat",
        }),
    ))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    let Some(id) = parse_id(&id)? else {
        return Err(AppError::NotFound("User tidak ditemukan"));
    };

    let user = state
        .store
        .find_by_id(id)
        .await
        .map_err(|e| AppError::internal("Terjadi kesalahan saat mengambil data user", e))?
        .ok_or(AppError::NotFound("User tidak ditemukan"))?;

    Ok(Json(UserResponse {
        success: true,
        user: user.into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<UserPayload>,
) -> Result<Json<MessageResponse>, AppError> {
    const FAILED: &str = "Terjadi kesalahan saat mengupdate user";

    let id = parse_id(&id)?;

    let Some(email) = payload.email() else {
        warn!(user_id = ?id, "missing email");
        return Err(AppError::Validation("Email wajib diisi"));
    };

    // Omitting the role resets it to the default.
    let role = payload.role_or_default().map_err(|e| {
        warn!(error = %e, "invalid role");
        AppError::Validation("Role tidak valid")
    })?;

    let password = payload.password();
    if password.is_some_and(|p| !is_long_enough(p)) {
        warn!(user_id = ?id, "password too short");
        return Err(AppError::Validation("Password minimal 6 karakter"));
    }

    let Some(id) = id else {
        return Err(AppError::NotFound("User tidak ditemukan"));
    };

    match state.store.find_by_id(id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Err(AppError::NotFound("User tidak ditemukan")),
        Err(e) => return Err(AppError::internal(FAILED, e)),
    }

    match state.store.find_by_email(email).await {
        Ok(Some(other)) if other.id != id => {
            warn!(user_id = id, other_id = other.id, "email belongs to another user");
            return Err(AppError::Conflict("Email sudah digunakan user lain"));
        }
        Ok(_) => {}
        Err(e) => return Err(AppError::internal(FAILED, e)),
    }

    let password_hash = match password {
        Some(p) => Some(hash_password(p).map_err(|e| AppError::internal(FAILED, e))?),
        None => None,
    };

    let changes = UserChanges {
        email: email.to_string(),
        password_hash,
        role,
    };

    match state.store.update(id, &changes).await {
        Ok(true) => {}
        Ok(false) => return Err(AppError::NotFound("User tidak ditemukan")),
        Err(StoreError::EmailTaken) => {
            return Err(AppError::Conflict("Email sudah digunakan user lain"))
        }
        Err(e) => return Err(AppError::internal(FAILED, e)),
    }

    info!(
        user_id = id,
        role = ?changes.role,
        password_changed = changes.password_hash.is_some(),
        "user updated"
    );
    Ok(Json(MessageResponse {
        success: true,
        message: "User berhasil diupdate",
    }))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let Some(id) = parse_id(&id)? else {
        return Err(AppError::NotFound("User tidak ditemukan"));
    };

    let deleted = state
        .store
        .delete(id)
        .await
        .map_err(|e| AppError::internal("Terjadi kesalahan saat menghapus user", e))?;

    if !deleted {
        return Err(AppError::NotFound("User tidak ditemukan"));
    }

    info!(user_id = id, "user deleted");
    Ok(Json(MessageResponse {
        success: true,
        message: "User berhasil dihapus",
    }))
}
