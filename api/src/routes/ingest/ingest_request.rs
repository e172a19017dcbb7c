use serde::Deserialize;

/// Request payload for /add_text.
#[derive(Debug, Deserialize)]
pub struct AddTextRequest {
    pub text: String,
    /// Defaults to "Manual input" when missing or blank.
    #[serde(default)]
    pub title: Option<String>,
}

/// Request payload for /add_website.
#[derive(Debug, Deserialize)]
pub struct AddWebsiteRequest {
    pub url: String,
}
