use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use seatlock_core::types::{ReservationError, SeatStats};

// ─── Request Types ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SeatRequest {
    pub user: String,
}

impl SeatRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.user.trim().is_empty() {
            return Err(ApiError::BadRequest("user is required".to_string()));
        }
        Ok(())
    }
}

// ─── Response Types ─────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            code: None,
        }
    }

    pub fn err(msg: impl Into<String>, code: &'static str) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
            code: Some(code),
        }
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub seats: SeatStats,
    pub version: String,
}

#[derive(Serialize)]
pub struct SweepResponse {
    pub swept: usize,
}

// ─── Errors ─────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Reservation(ReservationError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Reservation(err) => match err {
                ReservationError::NotFound(_) => StatusCode::NOT_FOUND,
                ReservationError::InvalidIdentity => StatusCode::BAD_REQUEST,
                ReservationError::AlreadyLocked(_) => StatusCode::LOCKED,
                ReservationError::AlreadyBooked(_) => StatusCode::CONFLICT,
                ReservationError::NotLocked(_) => StatusCode::CONFLICT,
                ReservationError::LockExpired(_) => StatusCode::GONE,
                ReservationError::WrongHolder(_) => StatusCode::FORBIDDEN,
                ReservationError::Immutable(_) => StatusCode::CONFLICT,
            },
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Reservation(err) => err.code(),
        }
    }
}

impl From<ReservationError> for ApiError {
    fn from(err: ReservationError) -> Self {
        ApiError::Reservation(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let message = match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::Reservation(err) => err.to_string(),
        };
        (status, Json(ApiResponse::<()>::err(message, code))).into_response()
    }
}
