//! 任务管理服务的认证子系统
//! 注册、凭证校验、令牌签发与受保护路由的请求门禁

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod telemetry;

use std::sync::Arc;

/// 组装应用状态
pub fn build_state(
    config: &config::AppConfig,
    store: Arc<dyn repository::AccountStore>,
) -> Result<Arc<middleware::AppState>, error::AppError> {
    let token_manager = Arc::new(auth::TokenManager::from_config(config)?);
    let auth_service = Arc::new(services::AuthService::from_config(
        config,
        store,
        token_manager.clone(),
    )?);

    Ok(Arc::new(middleware::AppState {
        auth_service,
        token_manager,
    }))
}
