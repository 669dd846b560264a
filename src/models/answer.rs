use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Recorded for every question the user never answered.
pub const NOT_ANSWERED: &str = "Not answered";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub question_id: Uuid,
    pub selected_option: String,
}
