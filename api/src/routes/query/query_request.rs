use serde::Deserialize;

/// Request payload for /query.
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub question: String,
    /// Optional number of hits; must be positive.
    #[serde(default)]
    pub k: Option<i64>,
}
