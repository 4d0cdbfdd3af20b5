//! 统一错误模型
//! 定义所有错误类型和错误响应格式

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use thiserror::Error;

/// 结果类型别名
pub type Result<T> = std::result::Result<T, AppError>;

/// 应用错误类型
///
/// 每个变体对应一个稳定的错误种类（见 [`AppError::kind`]），
/// HTTP 边界只在 `status_code` / `kind` 中做一次穷尽匹配。
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Password must be at least {0} characters long")]
    PasswordTooShort(usize),

    #[error("Email already registered")]
    EmailExists,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Missing authorization token")]
    MissingToken,

    #[error("Invalid authorization header format")]
    InvalidTokenFormat,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// 获取 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::InvalidEmail | AppError::PasswordTooShort(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::EmailExists => StatusCode::CONFLICT,
            AppError::InvalidCredentials
            | AppError::MissingToken
            | AppError::InvalidTokenFormat
            | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Database(_) | AppError::Config(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// 机器可读的错误种类
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_error",
            AppError::InvalidEmail => "invalid_email",
            AppError::PasswordTooShort(_) => "password_too_short",
            AppError::EmailExists => "email_exists",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::MissingToken => "missing_token",
            AppError::InvalidTokenFormat => "invalid_token_format",
            AppError::InvalidToken => "invalid_token",
            AppError::NotFound(_) => "not_found",
            AppError::Timeout(_) => "timeout",
            AppError::Database(_) | AppError::Config(_) | AppError::Internal(_) => {
                "internal_error"
            }
        }
    }

    /// 获取用户友好的错误消息（不包含敏感信息）
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::InvalidEmail => "Invalid email format".to_string(),
            AppError::PasswordTooShort(_) => self.to_string(),
            AppError::EmailExists => "Email already registered".to_string(),
            AppError::InvalidCredentials => "Invalid email or password".to_string(),
            AppError::MissingToken => "Authorization header required".to_string(),
            AppError::InvalidTokenFormat => {
                "Authorization header must be 'Bearer <token>'".to_string()
            }
            AppError::InvalidToken => "Invalid or expired token".to_string(),
            AppError::NotFound(msg) => format!("Resource not found: {}", msg),
            AppError::Timeout(_) => "Request timed out".to_string(),
            AppError::Database(_) => "Database error occurred".to_string(),
            AppError::Config(_) => "Configuration error".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
        }
    }

    /// 获取错误码
    pub fn code(&self) -> u16 {
        self.status_code().as_u16()
    }

    /// 是否为服务端内部错误
    pub fn is_internal(&self) -> bool {
        self.status_code().is_server_error()
    }

    // 便捷方法
    pub fn not_found(msg: &str) -> Self {
        AppError::NotFound(msg.to_string())
    }

    pub fn validation(msg: &str) -> Self {
        AppError::Validation(msg.to_string())
    }

    pub fn internal_error(msg: &str) -> Self {
        AppError::Internal(msg.to_string())
    }

    pub fn timeout(msg: &str) -> Self {
        AppError::Timeout(msg.to_string())
    }
}

/// 错误响应 DTO
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: u16,
    pub kind: &'static str,
    pub message: String,
    pub request_id: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let request_id = uuid::Uuid::new_v4().to_string();

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: self.code(),
                kind: self.kind(),
                message: self.user_message(),
                request_id,
            },
        };

        // 内部错误记录完整细节，客户端错误仅记录种类
        if self.is_internal() {
            tracing::error!(
                code = self.code(),
                kind = self.kind(),
                message = %self,
                request_id = %error_response.error.request_id,
                "Application error"
            );
        } else {
            tracing::debug!(
                code = self.code(),
                kind = self.kind(),
                request_id = %error_response.error.request_id,
                "Request rejected"
            );
        }

        (status, Json(error_response)).into_response()
    }
}

/// 从 config::ConfigError 转换
impl From<config::ConfigError> for AppError {
    fn from(e: config::ConfigError) -> Self {
        AppError::Config(e.to_string())
    }
}

/// 阻塞任务被取消或 panic
impl From<tokio::task::JoinError> for AppError {
    fn from(e: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("Blocking task failed: {}", e))
    }
}
