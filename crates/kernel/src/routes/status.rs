//! Database status probe.
//!
//! Always answers 200; connection problems are reported in the body.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::db::StoreError;
use crate::models::{Idea, IdeaSummary};
use crate::routes::helpers::iso_timestamp;
use crate::state::AppState;

/// Number of recent ideas included in the probe.
const SAMPLE_SIZE: i64 = 3;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DbStatusResponse {
    connected: bool,
    error: Option<String>,
    total_records: i64,
    sample_data: Vec<IdeaSummary>,
    timestamp: String,
}

/// Create the status router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/db-status", get(db_status))
}

async fn probe(state: &AppState) -> Result<(i64, Vec<IdeaSummary>), StoreError> {
    let pool = state.db().await?;
    let total = Idea::count_all(pool).await?;
    let sample = Idea::recent(pool, SAMPLE_SIZE).await?;
    Ok((total, sample))
}

async fn db_status(State(state): State<AppState>) -> Json<DbStatusResponse> {
    let response = match state.timed("status", probe(&state)).await {
        Ok((total_records, sample_data)) => DbStatusResponse {
            connected: true,
            error: None,
            total_records,
            sample_data,
            timestamp: iso_timestamp(),
        },
        Err(e) => {
            tracing::warn!(error = %e, "database status probe failed");
            DbStatusResponse {
                connected: false,
                error: Some(e.to_string()),
                total_records: 0,
                sample_data: Vec::new(),
                timestamp: iso_timestamp(),
            }
        }
    };

    Json(response)
}
