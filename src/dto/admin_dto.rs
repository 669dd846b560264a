use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestion {
    #[validate(length(min = 1, message = "Question text is required"))]
    pub question: String,
    #[validate(length(min = 2, message = "At least two options are required"))]
    pub options: Vec<String>,
    #[validate(length(min = 1, message = "The correct answer is required"))]
    pub correct_answer: String,
    #[validate(range(min = 1, message = "Points must be at least 1"))]
    pub points: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTestPayload {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    pub description: Option<String>,
    #[validate(range(min = 1, message = "The time limit must be at least one minute"))]
    pub time_limit: u32,
    #[validate(length(min = 1, message = "Department is required"))]
    pub department: String,
    #[validate(length(min = 1, message = "At least one question is required"))]
    pub questions: Vec<CreateQuestion>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTestResponse {
    pub message: String,
    pub test_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportTestResponse {
    pub message: String,
    pub test_id: Uuid,
    pub question_count: usize,
}
