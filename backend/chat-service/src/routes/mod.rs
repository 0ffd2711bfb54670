use crate::state::AppState;
use axum::middleware;
use axum::{
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Serialize;

pub mod attachments;
pub mod auth;
pub mod groups;
pub mod members;
pub mod messages;
pub mod presence;
pub mod schedule;
pub mod typing;

use attachments::{download_attachment, issue_upload};
use auth::{login, register};
use groups::{add_member, create_group, delete_group, list_groups, remove_member};
use members::list_members;
use messages::{get_messages, mark_read, send_message, unread_counts};
use presence::{heartbeat, presence_snapshot};
use schedule::{get_work_schedule, put_work_schedule};
use typing::{list_typing, start_typing, stop_typing};

/// Success envelope shared by every handler: `success: true` plus the
/// payload fields, mirroring the failure envelope in error_handling
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    #[serde(flatten)]
    pub data: T,
}

pub fn ok<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope {
        success: true,
        data,
    })
}

pub fn build_router(state: &AppState) -> Router<AppState> {
    // Public endpoints: liveness plus the two credential flows
    let public = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/auth", post(login))
        .route("/register", post(register));

    // Everything else requires a session token
    let secured = Router::new()
        // Members
        .route("/members", get(list_members))
        // Messages
        .route("/messages", post(send_message))
        .route("/messages", get(get_messages))
        .route("/messages/mark-read", post(mark_read))
        .route("/messages/unread-counts", get(unread_counts))
        // Groups
        .route("/groups", post(create_group))
        .route("/groups", get(list_groups))
        .route("/groups/:id/members", put(add_member))
        .route("/groups/:id/members/:member_id", delete(remove_member))
        .route("/groups/:id", delete(delete_group))
        // Typing signals
        .route("/typing/start", post(start_typing))
        .route("/typing/stop", post(stop_typing))
        .route("/typing", get(list_typing))
        // Attachments
        .route("/files", post(issue_upload))
        .route("/attachments", get(download_attachment))
        // Presence
        .route("/presence/heartbeat", post(heartbeat))
        .route("/presence", get(presence_snapshot))
        // Work schedule
        .route("/work-schedule", get(get_work_schedule))
        .route("/work-schedule", put(put_work_schedule))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::auth::auth_middleware,
        ));

    crate::middleware::with_defaults(public.merge(secured))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Payload {
        value: u32,
    }

    #[test]
    fn envelope_flattens_payload_fields() {
        let body = Envelope {
            success: true,
            data: Payload { value: 7 },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["value"], 7);
    }
}
