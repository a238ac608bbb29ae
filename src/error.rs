//! Domain errors and their HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::protocol::ApiResponse;
use crate::store::StoreError;

/// Result type for room and game operations
pub type GameResult<T> = Result<T, GameError>;

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("{0}")]
    Validation(String),

    #[error("Only the host can {0}")]
    Authorization(&'static str),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Room is full ({0} players)")]
    Capacity(usize),

    #[error("{0}")]
    State(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl GameError {
    pub fn status(&self) -> StatusCode {
        match self {
            GameError::Validation(_)
            | GameError::Authorization(_)
            | GameError::Capacity(_)
            | GameError::State(_) => StatusCode::BAD_REQUEST,
            GameError::NotFound(_) => StatusCode::NOT_FOUND,
            // The row vanished between read and write, usually a concurrent host leave
            GameError::Store(StoreError::MissingRow { .. }) => StatusCode::NOT_FOUND,
            GameError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to return to clients
    pub fn public_message(&self) -> String {
        match self {
            GameError::Store(StoreError::MissingRow { .. }) => "Room not found".to_string(),
            GameError::Store(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for GameError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }
        let body: ApiResponse<()> = ApiResponse::error(self.public_message());
        (status, Json(body)).into_response()
    }
}
