//! Notes widget routes — list, add, delete against the `notifications` table.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::services::data::{self, SelectQuery};
use crate::state::AppState;

pub(crate) const NOTES_TABLE: &str = "notifications";
pub(crate) const NOTES_LIMIT: u32 = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Deserialize)]
pub struct NewNote {
    pub message: String,
    #[serde(default)]
    pub priority: Priority,
}

pub(crate) fn note_rows(note: &NewNote) -> Value {
    serde_json::json!([{
        "type_notif": "note",
        "message_notif": note.message,
        "priorite": note.priority,
    }])
}

/// The five most recent notes; a failed fetch is logged and reported as an
/// empty list.
async fn recent_notes(state: &AppState) -> Vec<Value> {
    let query = SelectQuery::new(NOTES_TABLE)
        .order_desc("date_notif")
        .limit(NOTES_LIMIT);
    match data::fetch_rows(&state.data, &query).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!(error = %e, "notes fetch failed");
            Vec::new()
        }
    }
}

/// `GET /api/notes`
pub async fn list_notes(State(state): State<AppState>) -> Json<Vec<Value>> {
    Json(recent_notes(&state).await)
}

/// `POST /api/notes` — insert, then return the refreshed list. Insert
/// failures are logged and swallowed; the caller just sees the unchanged list.
pub async fn create_note(State(state): State<AppState>, Json(body): Json<NewNote>) -> Response {
    if body.message.trim().is_empty() {
        let error = serde_json::json!({ "error": "note message is empty" });
        return (StatusCode::BAD_REQUEST, Json(error)).into_response();
    }

    if let Err(e) = data::insert_rows(&state.data, NOTES_TABLE, &note_rows(&body)).await {
        tracing::error!(error = %e, "note insert failed");
    }

    Json(recent_notes(&state).await).into_response()
}

/// `DELETE /api/notes/{id}` — delete by `code_notif`.
pub async fn delete_note(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match data::delete_rows(&state.data, NOTES_TABLE, "code_notif", &id.to_string()).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            tracing::error!(error = %e, note = id, "note delete failed");
            let error = serde_json::json!({ "error": e.to_string() });
            (StatusCode::BAD_GATEWAY, Json(error)).into_response()
        }
    }
}

#[cfg(test)]
#[path = "notes_test.rs"]
mod tests;
