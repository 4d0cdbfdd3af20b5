//! JWT 认证中间件
//! 按顺序检查：Authorization 头存在 -> Bearer 格式 -> 令牌有效，任一失败立即终止

use crate::{auth::jwt::TokenManager, error::AppError};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use uuid::Uuid;

/// 认证上下文（附加到请求扩展）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub account_id: Uuid,
    pub email: String,
}

// 实现 FromRequestParts 以便在 handler 中直接提取 AuthContext
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or(AppError::MissingToken)
    }
}

/// 从 Authorization 头提取令牌
pub fn extract_token(headers: &HeaderMap) -> Result<String, AppError> {
    let value = headers.get(AUTHORIZATION).ok_or(AppError::MissingToken)?;
    let value = value.to_str().map_err(|_| AppError::InvalidTokenFormat)?;

    // 必须恰好两段：scheme 与 token
    let parts: Vec<&str> = value.split(' ').collect();
    match parts.as_slice() {
        [scheme, token] if scheme.eq_ignore_ascii_case("bearer") => Ok((*token).to_string()),
        _ => Err(AppError::InvalidTokenFormat),
    }
}

/// 校验令牌并构造认证上下文
pub fn authenticate(tokens: &TokenManager, headers: &HeaderMap) -> Result<AuthContext, AppError> {
    let token = extract_token(headers)?;
    let claims = tokens.validate_token(&token)?;

    Ok(AuthContext {
        account_id: claims.account_id()?,
        email: claims.email,
    })
}

/// JWT 认证中间件 - 必须认证
pub async fn jwt_auth_middleware(
    State(tokens): State<Arc<TokenManager>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_context = authenticate(&tokens, req.headers()).map_err(|e| {
        tracing::debug!(kind = e.kind(), uri = %req.uri(), "Request gate rejected request");
        e
    })?;

    // 附加到请求扩展
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
