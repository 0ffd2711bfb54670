use axum::extract::State;

use crate::error::AppError;
use crate::models::conversation::normalize_id;
use crate::security::token;
use crate::state::AppState;

/// Authenticated caller, parked in request extensions by the middleware and
/// picked up by the `CurrentMember` extractor
#[derive(Debug, Clone)]
pub struct AuthMember {
    pub id: String,
    pub display_name: String,
    pub role: Option<String>,
}

/// Middleware: require a Bearer session token on every secured route and
/// expose the caller to handlers
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: axum::extract::Request,
    next: axum::middleware::Next,
) -> Result<axum::response::Response, AppError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let raw = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AppError::Unauthorized)?;

    let claims = token::verify_token(&state.config.jwt_secret, raw)?;

    req.extensions_mut().insert(AuthMember {
        id: normalize_id(&claims.sub),
        display_name: claims.name,
        role: claims.role,
    });

    Ok(next.run(req).await)
}
