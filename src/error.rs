use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::repository::RepositoryError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Cart is empty")]
    EmptyCart,

    #[error("One or more products are invalid")]
    InvalidProduct,

    #[error("Invalid payment method")]
    InvalidPaymentMethod,

    #[error("cardLast4 must be exactly 4 digits")]
    InvalidCardDigits,

    #[error("Not Found")]
    NotFound,

    #[error("Storage error")]
    Persistence(#[from] RepositoryError),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_)
            | AppError::EmptyCart
            | AppError::InvalidProduct
            | AppError::InvalidPaymentMethod
            | AppError::InvalidCardDigits => StatusCode::BAD_REQUEST,
            AppError::DuplicateEmail => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Persistence(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code sent alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "invalid_input",
            AppError::DuplicateEmail => "duplicate_email",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::Unauthorized => "unauthorized",
            AppError::EmptyCart => "empty_cart",
            AppError::InvalidProduct => "invalid_product",
            AppError::InvalidPaymentMethod => "invalid_payment_method",
            AppError::InvalidCardDigits => "invalid_card_digits",
            AppError::NotFound => "not_found",
            AppError::Persistence(_) => "persistence_error",
            AppError::Internal(_) => "internal_error",
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub message: String,
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Persistence(err) => {
                tracing::error!(error = %err, "storage failure");
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal failure");
            }
            _ => {}
        }

        let body = ErrorBody {
            message: self.to_string(),
            error: self.code().to_string(),
        };

        (self.status(), axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
