use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use uuid::Uuid;

use crate::dto::admin_dto::{CreateTestPayload, CreateTestResponse, ImportTestResponse};
use crate::error::Error;
use crate::services::export_service::ExportService;
use crate::services::import_service::ImportService;
use crate::AppState;

#[axum::debug_handler]
pub async fn list_tests(State(state): State<AppState>) -> crate::error::Result<Response> {
    let grouped = state.test_service.list_grouped().await;
    Ok(Json(grouped).into_response())
}

#[axum::debug_handler]
pub async fn create_test(
    State(state): State<AppState>,
    Json(payload): Json<CreateTestPayload>,
) -> crate::error::Result<Response> {
    let test = state.test_service.create_test(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateTestResponse {
            message: "Test created successfully".to_string(),
            test_id: test.id,
        }),
    )
        .into_response())
}

#[axum::debug_handler]
pub async fn delete_test(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> crate::error::Result<Response> {
    state.test_service.delete_test(id).await?;
    Ok(Json(json!({ "message": "Test deleted successfully" })).into_response())
}

/// Bulk import: multipart form with the test metadata fields plus a CSV
/// file of question rows. A single bad row rejects the whole upload.
#[axum::debug_handler]
pub async fn import_test(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> crate::error::Result<Response> {
    let mut title: Option<String> = None;
    let mut department: Option<String> = None;
    let mut time_limit: Option<u32> = None;
    let mut description: Option<String> = None;
    let mut file: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "title" => title = Some(field.text().await?),
            "department" => department = Some(field.text().await?),
            "timeLimit" => {
                let raw = field.text().await?;
                let parsed = raw.trim().parse().map_err(|_| {
                    Error::BadRequest("The time limit must be a whole number of minutes".to_string())
                })?;
                time_limit = Some(parsed);
            }
            "description" => {
                let text = field.text().await?;
                if !text.trim().is_empty() {
                    description = Some(text);
                }
            }
            "file" => file = Some(field.bytes().await?.to_vec()),
            _ => {}
        }
    }

    let title = title
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| Error::BadRequest("Title is required".to_string()))?;
    let department =
        department.ok_or_else(|| Error::BadRequest("Department is required".to_string()))?;
    let time_limit =
        time_limit.ok_or_else(|| Error::BadRequest("Time limit is required".to_string()))?;
    let file = file.ok_or_else(|| Error::BadRequest("A question file is required".to_string()))?;

    let questions = ImportService::parse_questions(&file)?;
    let question_count = questions.len();

    let test = state
        .test_service
        .create_test(CreateTestPayload {
            title,
            description,
            time_limit,
            department,
            questions,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ImportTestResponse {
            message: "Questions imported successfully".to_string(),
            test_id: test.id,
            question_count,
        }),
    )
        .into_response())
}

#[axum::debug_handler]
pub async fn list_results(State(state): State<AppState>) -> crate::error::Result<Response> {
    let results = state.result_store.list_all().await;
    Ok(Json(results).into_response())
}

#[axum::debug_handler]
pub async fn delete_result(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> crate::error::Result<Response> {
    state.result_store.delete(id).await?;
    Ok(Json(json!({ "message": "Result deleted successfully" })).into_response())
}

/// All stored results as a styled XLSX download.
#[axum::debug_handler]
pub async fn export_results(State(state): State<AppState>) -> crate::error::Result<Response> {
    let results = state.result_store.list_all().await;
    let buffer = ExportService::generate_results_xlsx(&results)?;

    let filename = format!("results_{}.xlsx", chrono::Utc::now().format("%Y%m%d"));
    let disposition = format!("attachment; filename=\"{}\"", filename);

    Ok((
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet".to_string(),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        buffer,
    )
        .into_response())
}
