//! Authentication extractor - the identity resolver consumed by handlers.

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use futures::future::LocalBoxFuture;

use gazette_core::domain::Role;
use gazette_core::policy::Actor;
use gazette_core::ports::AuthError;

use crate::middleware::error::AppError;
use crate::state::AppState;

/// Authenticated user identity extractor.
///
/// Validates the Bearer token, then re-reads the referenced account so the
/// role is current and a token for a deleted account is rejected. Use this
/// in handlers to require authentication:
/// ```ignore
/// async fn protected_route(identity: Identity) -> impl Responder {
///     format!("Hello, user {}!", identity.user_id)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: uuid::Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl Identity {
    /// The policy-layer view of this identity.
    pub fn actor(&self) -> Actor {
        Actor::Identified {
            id: self.user_id,
            role: self.role,
        }
    }
}

impl FromRequest for Identity {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let Some(state) = req.app_data::<web::Data<AppState>>() else {
                tracing::error!("AppState not found in app data");
                return Err(AppError::Internal("server configuration error".to_string()));
            };

            // Extract "Bearer <token>" from the Authorization header
            let token = req
                .headers()
                .get(header::AUTHORIZATION)
                .ok_or(AuthError::MissingAuth)?
                .to_str()
                .ok()
                .and_then(|s| s.strip_prefix("Bearer "))
                .ok_or_else(|| AuthError::InvalidToken("expected Bearer token".to_string()))?
                .to_string();

            let claims = state.tokens.validate_token(&token)?;

            // The token verified; the account it references must still exist.
            let user = state
                .users
                .find_by_id(claims.user_id)
                .await?
                .ok_or(AuthError::IdentityNotFound)?;

            Ok(Identity {
                user_id: user.id,
                name: user.name,
                email: user.email,
                role: user.role,
            })
        })
    }
}
