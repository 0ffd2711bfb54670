use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::member::MemberProfile;
use crate::routes::{ok, Envelope};
use crate::security::token;
use crate::services::member_service::MemberService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub display_name: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub member: MemberProfile,
}

/// POST /register
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Envelope<RegisterResponse>>), AppError> {
    let member =
        MemberService::register(&state.db, &body.email, &body.display_name, &body.password)
            .await?;
    Ok((StatusCode::CREATED, ok(RegisterResponse { member })))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub member_id: String,
    pub display_name: String,
    pub role: Option<String>,
    pub expires_in: i64,
}

/// POST /auth
///
/// Failure is a single undifferentiated 401 whether the member exists or
/// not.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<Envelope<LoginResponse>>, AppError> {
    let member = MemberService::authenticate(&state.db, &body.email, &body.password).await?;

    let token = token::issue_token(
        &state.config.jwt_secret,
        &member.id,
        &member.display_name,
        member.role.as_deref(),
        state.config.token_ttl_minutes,
    )?;

    Ok(ok(LoginResponse {
        token,
        member_id: member.id,
        display_name: member.display_name,
        role: member.role,
        expires_in: state.config.token_ttl_minutes * 60,
    }))
}
