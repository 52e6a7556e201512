/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON error body)
 * - HeroClientError を boundary で一括変換 (handler 側では catch しない)
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::clients::hero::HeroClientError;

/// boundary で返す JSON body。HTTP status と同じ数値を body にも重ねて返す
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: u16,
    pub message: &'static str,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("hero not found")]
    HeroNotFound,
    #[error("remote hero service unavailable")]
    UpstreamUnavailable(#[source] HeroClientError),
    #[error("internal server error")]
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::HeroNotFound => (StatusCode::NOT_FOUND, "Hero not found"),
            AppError::UpstreamUnavailable(_) => {
                (StatusCode::BAD_GATEWAY, "Remote hero service unavailable")
            }
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Unknown error occurred"),
        };

        // 詳細 (上流の生エラー) はログにだけ残し、クライアントには固定メッセージを返す
        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
        }

        let body = ErrorResponse {
            status: status.as_u16(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<HeroClientError> for AppError {
    fn from(e: HeroClientError) -> Self {
        match e {
            HeroClientError::NotFound => AppError::HeroNotFound,
            other => AppError::UpstreamUnavailable(other),
        }
    }
}
