use serde::Deserialize;

/// Request payload for /generate_answer.
#[derive(Debug, Deserialize)]
pub struct GenerateAnswerRequest {
    /// Natural language question.
    pub question: String,
    /// Optional retrieval fan-out; must be positive.
    #[serde(default)]
    pub k: Option<i64>,
}
