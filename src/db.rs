//! 数据库连接池与迁移管理

use crate::config::DatabaseConfig;
use secrecy::ExposeSecret;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

/// 数据库错误类型
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}

/// 创建数据库连接池
///
/// `acquire_timeout` 限制等待连接的时间，存储调用不会因连接池耗尽而无限阻塞
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, DbError> {
    tracing::debug!("Creating database connection pool...");

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .connect(config.url.expose_secret())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to create database pool");
            DbError::ConnectionFailed(e.to_string())
        })?;

    tracing::info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Database pool created"
    );

    Ok(pool)
}

/// 运行嵌入的数据库迁移（accounts 表）
pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
    sqlx::migrate!("./migrations").run(pool).await.map_err(|e| {
        tracing::error!(error = %e, "Migration failed");
        DbError::MigrationFailed(e.to_string())
    })?;

    tracing::info!("Migrations applied");
    Ok(())
}

/// 连接数据库并完成迁移
pub async fn init(config: &DatabaseConfig) -> Result<PgPool, DbError> {
    let pool = create_pool(config).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}
