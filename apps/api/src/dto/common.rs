use serde::Serialize;

/// Generic message response.
#[derive(Debug, Serialize)]
pub struct GenericMessageResponse {
    pub message: String,
}
