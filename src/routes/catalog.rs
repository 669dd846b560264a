use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::Error;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListTestsQuery {
    pub department: Option<String>,
}

#[axum::debug_handler]
pub async fn list_tests(
    State(state): State<AppState>,
    Query(query): Query<ListTestsQuery>,
) -> crate::error::Result<Response> {
    let department = query
        .department
        .filter(|d| !d.is_empty())
        .ok_or_else(|| Error::BadRequest("Department is required".to_string()))?;
    let tests = state.catalog_service.list_for_department(&department).await;
    Ok(Json(tests).into_response())
}

#[axum::debug_handler]
pub async fn get_test(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let test = state.catalog_service.get(id).await?;
    Ok(Json(test).into_response())
}
