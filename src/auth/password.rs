//! 基于 Argon2id 的密码哈希与校验

use crate::{config::AppConfig, error::AppError};
use argon2::{Algorithm, Argon2, Params, Version};
use password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};

/// 参数可配置的密码哈希器
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// 使用 argon2 默认参数（m=19MiB, t=2, p=1）
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }

    /// 使用显式开销参数
    pub fn with_params(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, AppError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| AppError::Config(format!("Invalid Argon2 params: {}", e)))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// 从配置创建
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let security = &config.security;
        Self::with_params(
            security.argon2_memory_kib,
            security.argon2_iterations,
            security.argon2_parallelism,
        )
    }

    /// 生成自描述的 PHC 格式哈希
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!("Failed to hash password: {:?}", e);
                AppError::internal_error("failed to hash password")
            })?
            .to_string();

        Ok(password_hash)
    }

    /// 校验密码与已存哈希
    ///
    /// 不匹配与哈希格式错误都返回 `false`
    pub fn verify(&self, hash: &str, password: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!("Failed to parse password hash: {:?}", e);
                return false;
            }
        };

        self.argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
