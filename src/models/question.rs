use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A multiple-choice question. The correct answer is matched against the
/// selected option by exact string equality, not by index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: Uuid,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub points: u32,
}
