//! Account repository (数据库访问层)

use crate::{error::AppError, models::account::Account};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL 唯一约束冲突
const UNIQUE_VIOLATION: &str = "23505";

/// 账户持久化契约
///
/// 邮箱唯一性由存储保证，冲突返回 `AppError::EmailExists`。
/// 调用方为每次调用设置截止时间，丢弃 future 即取消调用。
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// 插入新账户
    async fn create(&self, account: &Account) -> Result<Account, AppError>;

    /// 根据 ID 查找账户
    async fn get_by_id(&self, id: Uuid) -> Result<Account, AppError>;

    /// 根据邮箱查找账户
    async fn get_by_email(&self, email: &str) -> Result<Account, AppError>;

    /// 更新已有账户的邮箱与密码哈希
    async fn update(&self, account: &Account) -> Result<Account, AppError>;

    /// 删除账户
    async fn delete(&self, id: Uuid) -> Result<(), AppError>;

    /// 连通性检查（就绪探针）
    async fn ping(&self) -> Result<(), AppError>;
}

pub struct PgAccountRepository {
    db: PgPool,
}

impl PgAccountRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn map_write_error(e: sqlx::Error) -> AppError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            return AppError::EmailExists;
        }
    }
    AppError::Database(e)
}

#[async_trait]
impl AccountStore for PgAccountRepository {
    async fn create(&self, account: &Account) -> Result<Account, AppError> {
        let created = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (id, email, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, password_hash, created_at, updated_at
            "#,
        )
        .bind(account.id)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.created_at)
        .bind(account.updated_at)
        .fetch_one(&self.db)
        .await
        .map_err(map_write_error)?;

        Ok(created)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Account, AppError> {
        sqlx::query_as::<_, Account>(
            "SELECT id, email, password_hash, created_at, updated_at FROM accounts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::not_found("account"))
    }

    async fn get_by_email(&self, email: &str) -> Result<Account, AppError> {
        sqlx::query_as::<_, Account>(
            "SELECT id, email, password_hash, created_at, updated_at FROM accounts WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::not_found("account"))
    }

    async fn update(&self, account: &Account) -> Result<Account, AppError> {
        sqlx::query_as::<_, Account>(
            r#"
            UPDATE accounts
            SET
                email = $2,
                password_hash = $3,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, email, password_hash, created_at, updated_at
            "#,
        )
        .bind(account.id)
        .bind(&account.email)
        .bind(&account.password_hash)
        .fetch_optional(&self.db)
        .await
        .map_err(map_write_error)?
        .ok_or_else(|| AppError::not_found("account"))
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("account"));
        }

        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }
}
