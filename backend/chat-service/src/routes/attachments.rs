use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::AppError;
use crate::middleware::guards::CurrentMember;
use crate::routes::ok;
use crate::services::storage::{ObjectStorage, UploadAuthorization};
use crate::state::AppState;

fn storage(state: &AppState) -> Result<&Arc<ObjectStorage>, AppError> {
    state
        .storage
        .as_ref()
        .ok_or_else(|| AppError::Storage("attachment store is not configured".into()))
}

#[derive(Debug, Deserialize)]
pub struct IssueUploadRequest {
    pub file_name: String,
    pub content_type: Option<String>,
}

/// POST /files
///
/// Issues a short-lived write authorization; the client uploads straight to
/// the object store and then references the returned key in a message.
pub async fn issue_upload(
    State(state): State<AppState>,
    _member: CurrentMember,
    Json(body): Json<IssueUploadRequest>,
) -> Result<Json<crate::routes::Envelope<UploadAuthorization>>, AppError> {
    let content_type = body
        .content_type
        .as_deref()
        .unwrap_or("application/octet-stream");
    let authorization = storage(&state)?
        .issue_upload(&body.file_name, content_type)
        .await?;
    Ok(ok(authorization))
}

#[derive(Debug, Deserialize)]
pub struct DownloadParams {
    pub key: String,
    #[serde(default = "default_redirect")]
    pub redirect: bool,
}

fn default_redirect() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct DownloadAuthorization {
    pub download_url: String,
}

/// GET /attachments?key=...
///
/// Answers with a temporary redirect to a read authorization; pass
/// `redirect=false` to receive the URL in the body instead.
pub async fn download_attachment(
    State(state): State<AppState>,
    _member: CurrentMember,
    Query(params): Query<DownloadParams>,
) -> Result<Response, AppError> {
    let url = storage(&state)?.issue_download(&params.key).await?;

    if params.redirect {
        Ok(Redirect::temporary(&url).into_response())
    } else {
        Ok(ok(DownloadAuthorization { download_url: url }).into_response())
    }
}
