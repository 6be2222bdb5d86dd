use serde::{Deserialize, Serialize};

/// Generic API response envelope used by the health route
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// Acknowledgement returned by the planning endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct StartedResponse {
    pub message: String,
}
