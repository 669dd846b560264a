use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json, Response},
};
use uuid::Uuid;

use crate::AppState;

#[axum::debug_handler]
pub async fn list_user_results(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let results = state.result_store.list_by_user(user_id).await;
    Ok(Json(results).into_response())
}
