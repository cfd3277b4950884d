//! Errors returned by request handlers and how they map to HTTP responses.

use crate::music_api::MusicApiError;
use crate::social::SocialError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::{error, warn};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Login required")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Social(#[from] SocialError),

    #[error("Music API request failed: {0}")]
    Upstream(#[from] MusicApiError),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn user_not_found(username: &str) -> Self {
        ApiError::NotFound(format!("User '{username}' not found"))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Social(SocialError::GroupNotFound(_) | SocialError::NotAMember(_)) => {
                StatusCode::NOT_FOUND
            }
            ApiError::Social(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match status {
            StatusCode::INTERNAL_SERVER_ERROR => error!("{self}"),
            StatusCode::BAD_GATEWAY => warn!("{self}"),
            _ => {}
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses() {
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::user_not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::from(SocialError::SelfFollow).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(SocialError::NotAMember("g".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(MusicApiError::Malformed("nope".into())).status(),
            StatusCode::BAD_GATEWAY
        );
    }
}
