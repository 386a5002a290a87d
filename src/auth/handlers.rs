use axum::{extract::State, routing::post, Json, Router};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, LoginUser, RegisterResponse},
        password::{hash_password, verify_password},
    },
    error::{ApiJson, AppError},
    state::AppState,
    users::{dto::UserPayload, repo::StoreError},
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<UserPayload>,
) -> Result<Json<RegisterResponse>, AppError> {
    const FAILED: &str = "Terjadi kesalahan saat register";

    let (Some(email), Some(password)) = (payload.email(), payload.password()) else {
        warn!("missing email or password");
        return Err(AppError::Validation("Email dan password wajib diisi"));
    };

    let role = payload.registration_role().map_err(|e| {
        warn!(error = %e, "invalid role");
        AppError::Validation("Role tidak valid")
    })?;

    // Ensure email is not taken
    match state.store.find_by_email(email).await {
        Ok(Some(_)) => {
            warn!(email = %email, "email already registered");
            return Err(AppError::Conflict("Email sudah terdaftar"));
        }
        Ok(None) => {}
        Err(e) => return Err(AppError::internal(FAILED, e)),
    }

    let hash = hash_password(password).map_err(|e| AppError::internal(FAILED, e))?;

    let user = match state.store.insert(email, &hash, role).await {
        Ok(u) => u,
        Err(StoreError::EmailTaken) => {
            warn!(email = %email, "email registered concurrently");
            return Err(AppError::Conflict("Email sudah terdaftar"));
        }
        Err(e) => return Err(AppError::internal(FAILED, e)),
    };

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok(Json(RegisterResponse {
        success: true,
        user: user.into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    const FAILED: &str = "Terjadi kesalahan saat login";
    const BAD_CREDENTIALS: &str = "Email atau password salah";

    let Some((email, password)) = payload.credentials() else {
        warn!("missing email or password");
        return Err(AppError::Validation("Email dan password wajib diisi"));
    };

    let user = match state.store.find_by_email(email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!(email = %email, "login unknown email");
            return Err(AppError::Auth(BAD_CREDENTIALS));
        }
        Err(e) => return Err(AppError::internal(FAILED, e)),
    };

    let ok = verify_password(password, &user.password_hash)
        .map_err(|e| AppError::internal(FAILED, e))?;

    if !ok {
        warn!(email = %email, user_id = user.id, "login invalid password");
        return Err(AppError::Auth(BAD_CREDENTIALS));
    }

    info!(user_id = user.id, email = %user.email, "user logged in");
    Ok(Json(LoginResponse {
        success: true,
        user: LoginUser {
            id: user.id,
            email: user.email,
        },
    }))
}
