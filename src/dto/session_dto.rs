use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::question::Question;
use crate::services::session_service::{EnvironmentEvent, SessionPhase, SessionStatus};

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub user_id: Uuid,
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[validate(length(min = 1, message = "Department is required"))]
    pub department: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub test_id: Uuid,
    pub user: SessionUser,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
    pub test_id: Uuid,
    pub title: String,
    pub description: String,
    pub time_limit: u32,
    pub question_count: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StartSessionRequest {
    pub fullscreen: bool,
}

/// A question as served into a running session: the correct answer never
/// leaves the server.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionQuestion {
    pub id: Uuid,
    pub question: String,
    pub options: Vec<String>,
    pub points: u32,
}

impl From<&Question> for SessionQuestion {
    fn from(question: &Question) -> Self {
        Self {
            id: question.id,
            question: question.question.clone(),
            options: question.options.clone(),
            points: question.points,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionResponse {
    pub phase: SessionPhase,
    pub time_remaining_seconds: u32,
    pub fullscreen_warning: bool,
    pub questions: Vec<SessionQuestion>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SelectAnswerRequest {
    pub question_id: Uuid,
    #[validate(length(min = 1, message = "An option must be selected"))]
    pub selected_option: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NavigateRequest {
    pub direction: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentEventRequest {
    pub event: EnvironmentEvent,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSummary {
    pub result_id: Uuid,
    pub score: u32,
    pub total_points: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusResponse {
    pub session_id: Uuid,
    pub phase: SessionPhase,
    pub time_remaining_seconds: u32,
    pub current_question: usize,
    pub question_count: usize,
    pub questions_answered: usize,
    pub fullscreen_warning: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_submit_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ResultSummary>,
}

impl From<SessionStatus> for SessionStatusResponse {
    fn from(status: SessionStatus) -> Self {
        Self {
            session_id: status.session_id,
            phase: status.phase,
            time_remaining_seconds: status.time_remaining,
            current_question: status.current_question,
            question_count: status.question_count,
            questions_answered: status.questions_answered,
            fullscreen_warning: status.fullscreen_warning,
            auto_submit_reason: status.auto_submit_reason,
            result: status.outcome.map(|o| ResultSummary {
                result_id: o.result_id,
                score: o.score,
                total_points: o.total_points,
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitSessionResponse {
    pub message: String,
    #[serde(flatten)]
    pub status: SessionStatusResponse,
}
