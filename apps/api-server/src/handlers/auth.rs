//! Authentication handlers.

use actix_web::{HttpResponse, web};

use gazette_core::domain::{Registration, User};
use gazette_shared::dto::{AuthResponse, LoginRequest, RegisterRequest, UserResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let registration = Registration {
        name: req.name,
        email: req.email,
        password: req.password,
        role: req.role,
    };
    let role = registration.validate()?;

    // Pre-check the unique email for a friendly error; the store's unique
    // index still backstops concurrent registrations.
    if state
        .users
        .find_by_email(&registration.email)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("email already registered".to_string()));
    }

    let password_hash = state.passwords.hash(&registration.password)?;
    let user = User::new(registration.name, registration.email, password_hash, role);
    let user = state.users.insert(user).await?;

    let token = state.tokens.generate_token(user.id, &user.name, user.role)?;

    tracing::info!(user_id = %user.id, "Registered new user");

    Ok(HttpResponse::Created().json(AuthResponse {
        user: user_response(&user),
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: state.tokens.expiration_seconds() as u64,
    }))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    // One failure path for unknown email and wrong password, so the
    // response does not reveal which one it was.
    let denied = || AppError::Unauthorized("invalid email or password".to_string());

    let user = state
        .users
        .find_by_email(&req.email)
        .await?
        .ok_or_else(denied)?;

    let valid = state.passwords.verify(&req.password, &user.password_hash)?;
    if !valid {
        return Err(denied());
    }

    let token = state.tokens.generate_token(user.id, &user.name, user.role)?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        user: user_response(&user),
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: state.tokens.expiration_seconds() as u64,
    }))
}

/// GET /api/auth/me - Protected route
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("account no longer exists".to_string()))?;

    Ok(HttpResponse::Ok().json(user_response(&user)))
}

pub(super) fn user_response(user: &User) -> UserResponse {
    UserResponse {
        id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
        role: user.role.as_str().to_string(),
        created_at: user.created_at,
    }
}
