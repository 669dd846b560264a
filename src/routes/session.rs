use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::session_dto::{
    CreateSessionRequest, CreateSessionResponse, EnvironmentEventRequest, NavigateRequest,
    SelectAnswerRequest, SessionQuestion, SessionStatusResponse, StartSessionRequest,
    StartSessionResponse, SubmitSessionResponse,
};
use crate::services::session_service::Examinee;
use crate::AppState;

#[axum::debug_handler]
pub async fn create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> crate::error::Result<Response> {
    req.user.validate()?;
    let test = state.catalog_service.get(req.test_id).await?;
    let examinee = Examinee {
        user_id: req.user.user_id,
        first_name: req.user.first_name,
        last_name: req.user.last_name,
        department: req.user.department,
    };
    let (test_id, title, description, time_limit, question_count) = (
        test.id,
        test.title.clone(),
        test.description.clone(),
        test.time_limit,
        test.questions.len(),
    );
    let status = state.session_service.create(test, examinee).await;
    let response = CreateSessionResponse {
        session_id: status.session_id,
        test_id,
        title,
        description,
        time_limit,
        question_count,
    };
    Ok((StatusCode::CREATED, Json(response)).into_response())
}

#[axum::debug_handler]
pub async fn start_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<StartSessionRequest>,
) -> crate::error::Result<Response> {
    let (status, questions) = state.session_service.start(id, req.fullscreen).await?;
    let response = StartSessionResponse {
        phase: status.phase,
        time_remaining_seconds: status.time_remaining,
        fullscreen_warning: status.fullscreen_warning,
        questions: questions.iter().map(SessionQuestion::from).collect(),
    };
    Ok(Json(response).into_response())
}

#[axum::debug_handler]
pub async fn select_answer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SelectAnswerRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let status = state
        .session_service
        .select_answer(id, req.question_id, req.selected_option)
        .await?;
    Ok(Json(SessionStatusResponse::from(status)).into_response())
}

#[axum::debug_handler]
pub async fn navigate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<NavigateRequest>,
) -> crate::error::Result<Response> {
    let status = state.session_service.navigate(id, req.direction).await?;
    Ok(Json(SessionStatusResponse::from(status)).into_response())
}

#[axum::debug_handler]
pub async fn environment_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<EnvironmentEventRequest>,
) -> crate::error::Result<Response> {
    let status = state.session_service.environment_event(id, req.event).await?;
    Ok(Json(SessionStatusResponse::from(status)).into_response())
}

#[axum::debug_handler]
pub async fn submit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let status = state.session_service.submit(id).await?;
    Ok(Json(SubmitSessionResponse {
        message: "Test submitted successfully".to_string(),
        status: status.into(),
    })
    .into_response())
}

#[axum::debug_handler]
pub async fn get_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let status = state.session_service.status(id).await?;
    Ok(Json(SessionStatusResponse::from(status)).into_response())
}
