//! APIエラーレスポンス型
//!
//! axum用の共通エラーハンドリング。ボディは常に `{"detail": "..."}`。

use crate::common::error::{AuthError, DispatchError, GateError};
use crate::common::protocol::ErrorDetail;
use axum::{extract::rejection::JsonRejection, response::IntoResponse, Json};

/// Axum用のエラーレスポンス型
#[derive(Debug)]
pub struct AppError(pub GateError);

impl From<GateError> for AppError {
    fn from(err: GateError) -> Self {
        AppError(err)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError(GateError::Auth(err))
    }
}

impl From<DispatchError> for AppError {
    fn from(err: DispatchError) -> Self {
        AppError(GateError::Dispatch(err))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError(GateError::InvalidBody {
            status: rejection.status(),
            message: rejection.body_text(),
        })
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.0.status_code();
        let payload = ErrorDetail {
            detail: self.0.external_message(),
        };
        (status, Json(payload)).into_response()
    }
}
