use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::answer::Answer;

/// A scored attempt. Written exactly once at submission; the score and
/// `total_points` are denormalized so later edits to the source test never
/// change a historical result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub id: Uuid,
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub department: String,
    pub test_id: Uuid,
    pub test_title: String,
    pub score: u32,
    pub total_points: u32,
    pub answers: Vec<Answer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_submit_reason: Option<String>,
    pub submitted_at: DateTime<Utc>,
}
