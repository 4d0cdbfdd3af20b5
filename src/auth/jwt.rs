//! JWT 令牌生成与校验
//! 无状态 HS256 bearer 令牌，服务端不做吊销

use crate::{config::AppConfig, error::AppError};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// HS256 密钥最小长度
pub const MIN_SECRET_LEN: usize = 32;

/// JWT 声明
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// 主体（账户 ID）
    pub sub: String,

    /// 账户邮箱
    pub email: String,

    /// 签发时间
    pub iat: i64,

    /// 过期时间
    pub exp: i64,
}

impl Claims {
    /// 将 sub 解析为账户 ID
    pub fn account_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub).map_err(|_| AppError::InvalidToken)
    }
}

/// 令牌签发与校验
///
/// 构造后不可变，通过 `Arc` 共享
pub struct TokenManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl TokenManager {
    /// 由原始密钥与有效期（小时）创建
    pub fn new(secret: &str, lifetime_hours: u64) -> Result<Self, AppError> {
        // HS256 密钥至少 32 字节
        if secret.len() < MIN_SECRET_LEN {
            return Err(AppError::Config("JWT secret too short (min 32 chars)".to_string()));
        }

        if lifetime_hours == 0 {
            return Err(AppError::Config("Token lifetime must be > 0".to_string()));
        }

        let lifetime = i64::try_from(lifetime_hours)
            .ok()
            .and_then(Duration::try_hours)
            .ok_or_else(|| AppError::Config("Token lifetime out of range".to_string()))?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            lifetime,
        })
    }

    /// 从配置创建
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        Self::new(
            config.security.jwt_secret.expose_secret(),
            config.security.token_lifetime_hours,
        )
    }

    /// 令牌有效期（秒）
    pub fn lifetime_secs(&self) -> u64 {
        self.lifetime.num_seconds().max(0) as u64
    }

    /// 为账户签发令牌
    pub fn generate_token(&self, subject_id: &Uuid, email: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let expiration = now + self.lifetime;

        let claims = Claims {
            sub: subject_id.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        };

        self.sign(&claims)
    }

    /// 签名任意声明
    pub fn sign(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode token: {:?}", e);
            AppError::internal_error("failed to encode token")
        })
    }

    /// 校验并解码令牌
    ///
    /// 格式错误、伪造、算法不符与过期统一返回 `InvalidToken`
    pub fn validate_token(&self, token: &str) -> Result<Claims, AppError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!("Token validation failed: {:?}", e);
                AppError::InvalidToken
            })?
            .claims;

        // 严格早于 exp 才有效
        if claims.exp <= Utc::now().timestamp() {
            tracing::debug!("Token validation failed: expired at boundary");
            return Err(AppError::InvalidToken);
        }

        Ok(claims)
    }
}
