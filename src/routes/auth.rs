use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};

use crate::dto::auth_dto::{LoginRequest, LoginResponse, SignupRequest, SignupResponse};
use crate::AppState;

#[axum::debug_handler]
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> crate::error::Result<Response> {
    let user_id = state.identity_service.signup(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "User created successfully".to_string(),
            user_id,
        }),
    )
        .into_response())
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> crate::error::Result<Response> {
    let user = state.identity_service.login(req).await?;
    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        user,
    })
    .into_response())
}
