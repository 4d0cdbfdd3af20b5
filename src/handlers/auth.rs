//! 认证相关的 HTTP 处理器

use crate::{
    auth::middleware::AuthContext,
    error::AppError,
    middleware::AppState,
    models::account::*,
};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;

/// 注册
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let account = state.auth_service.register(&req.email, &req.password).await?;

    Ok((StatusCode::CREATED, Json(AccountResponse::from(account))))
}

/// 登录
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let token = state.auth_service.login(&req.email, &req.password).await?;

    Ok(Json(LoginResponse {
        token,
        expires_in: state.auth_service.token_lifetime_secs(),
    }))
}

/// 获取当前用户信息
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
) -> Result<impl IntoResponse, AppError> {
    let account = state
        .auth_service
        .get_account_by_id(auth_context.account_id)
        .await?;

    Ok(Json(MeResponse {
        id: account.id,
        email: account.email,
    }))
}
