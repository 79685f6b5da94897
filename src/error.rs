//! Error handling for the application

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::pricing::responses::PricingErrorResponse;
use crate::pricing::PricingError;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AppError {
    fn status_and_type(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            AppError::Pricing(e) => {
                let status = match e {
                    PricingError::UnavailableRange { .. } => StatusCode::CONFLICT,
                    PricingError::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                    PricingError::InvalidRange { .. }
                    | PricingError::InvalidInsuranceTier(_)
                    | PricingError::InvalidDailyRate(_) => StatusCode::BAD_REQUEST,
                };
                (status, e.error_type())
            }
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.status_and_type();

        let message = if status.is_server_error() {
            tracing::error!("{}", self);
            "Internal error".to_string()
        } else {
            self.to_string()
        };

        let body = PricingErrorResponse {
            error_type: error_type.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_status_mapping() {
        let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        let err = AppError::from(PricingError::UnavailableRange { start: day, end: day });
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);

        let err = AppError::from(PricingError::InvalidInsuranceTier("gold".into()));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);

        let err = AppError::NotFound("listing".into());
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);

        let err = AppError::Database(sqlx::Error::RowNotFound);
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
