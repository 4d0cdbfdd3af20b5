//! 认证服务：注册、登录、令牌校验

use crate::{
    auth::{jwt::Claims, password::PasswordHasher, policy::PasswordPolicy, TokenManager},
    config::AppConfig,
    error::AppError,
    models::account::Account,
    repository::AccountStore,
};
use std::{future::Future, sync::Arc, time::Duration};
use tokio::sync::OnceCell;
use uuid::Uuid;

/// 单次存储调用的默认截止时间
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

// 未知邮箱登录时用于校验的占位口令
const DUMMY_PASSWORD: &str = "dummy-password-for-unknown-accounts";

pub struct AuthService {
    store: Arc<dyn AccountStore>,
    tokens: Arc<TokenManager>,
    hasher: Arc<PasswordHasher>,
    policy: PasswordPolicy,
    store_timeout: Duration,
    dummy_hash: OnceCell<String>,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn AccountStore>,
        tokens: Arc<TokenManager>,
        hasher: Arc<PasswordHasher>,
        policy: PasswordPolicy,
    ) -> Self {
        Self {
            store,
            tokens,
            hasher,
            policy,
            store_timeout: DEFAULT_STORE_TIMEOUT,
            dummy_hash: OnceCell::new(),
        }
    }

    /// 从配置构建
    pub fn from_config(
        config: &AppConfig,
        store: Arc<dyn AccountStore>,
        tokens: Arc<TokenManager>,
    ) -> Result<Self, AppError> {
        let hasher = Arc::new(PasswordHasher::from_config(config)?);
        let policy = PasswordPolicy::new(config.security.password_min_length);

        Ok(Self::new(store, tokens, hasher, policy)
            .with_store_timeout(Duration::from_secs(config.database.query_timeout_secs)))
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    /// 令牌有效期（秒），用于登录响应
    pub fn token_lifetime_secs(&self) -> u64 {
        self.tokens.lifetime_secs()
    }

    /// 注册新账户
    pub async fn register(&self, email: &str, password: &str) -> Result<Account, AppError> {
        if email.is_empty() || password.is_empty() {
            return Err(AppError::validation("email and password are required"));
        }

        self.policy.validate(password)?;

        // 构造时校验邮箱，哈希稍后填入
        let mut account = Account::new(email, String::new())?;

        match self.with_deadline(self.store.get_by_email(email)).await {
            Ok(_) => return Err(AppError::EmailExists),
            Err(AppError::NotFound(_)) => {}
            Err(e) => return Err(e),
        }

        account.password_hash = self.hash_password(password).await?;

        // 并发注册以存储的唯一约束为准
        let created = self.with_deadline(self.store.create(&account)).await?;

        tracing::info!(account_id = %created.id, "Account registered");

        Ok(created)
    }

    /// 用户登录，返回签名令牌
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AppError> {
        let account = match self.with_deadline(self.store.get_by_email(email)).await {
            Ok(account) => account,
            Err(AppError::NotFound(_)) => {
                // 未知邮箱与密码错误付出相同的 Argon2 开销
                let dummy = self
                    .dummy_hash
                    .get_or_try_init(|| self.hash_password(DUMMY_PASSWORD))
                    .await?;
                let _ = self.verify_password(dummy, password).await?;

                tracing::warn!("Login rejected");
                return Err(AppError::InvalidCredentials);
            }
            Err(e) => return Err(e),
        };

        if !self.verify_password(&account.password_hash, password).await? {
            tracing::warn!(account_id = %account.id, "Login rejected");
            return Err(AppError::InvalidCredentials);
        }

        let token = self.tokens.generate_token(&account.id, &account.email)?;

        tracing::info!(account_id = %account.id, "Login succeeded");

        Ok(token)
    }

    /// 校验令牌
    pub fn validate_token(&self, token: &str) -> Result<Claims, AppError> {
        self.tokens.validate_token(token)
    }

    /// 根据 ID 获取账户
    pub async fn get_account_by_id(&self, id: Uuid) -> Result<Account, AppError> {
        self.with_deadline(self.store.get_by_id(id)).await
    }

    /// 存储连通性检查
    pub async fn check_store(&self) -> Result<(), AppError> {
        self.with_deadline(self.store.ping()).await
    }

    async fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.hash(&password)).await?
    }

    async fn verify_password(&self, hash: &str, password: &str) -> Result<bool, AppError> {
        let hasher = self.hasher.clone();
        let hash = hash.to_string();
        let password = password.to_string();
        Ok(tokio::task::spawn_blocking(move || hasher.verify(&hash, &password)).await?)
    }

    async fn with_deadline<T, F>(&self, fut: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        tokio::time::timeout(self.store_timeout, fut)
            .await
            .map_err(|_| AppError::timeout("account store call exceeded deadline"))?
    }
}
