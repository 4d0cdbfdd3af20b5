//! 凭证策略：邮箱格式与密码强度规则

use crate::error::AppError;
use once_cell::sync::Lazy;
use regex::Regex;

/// 默认密码最小长度
pub const DEFAULT_PASSWORD_MIN_LENGTH: usize = 8;

// 固定正则，编译不会失败
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("hardcoded email regex is invalid")
});

/// 生效的密码策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub min_length: usize,
}

impl PasswordPolicy {
    pub fn new(min_length: usize) -> Self {
        Self { min_length }
    }

    pub fn validate(&self, password: &str) -> Result<(), AppError> {
        validate_password(password, self.min_length)
    }
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_PASSWORD_MIN_LENGTH)
    }
}

/// 校验邮箱格式（本地部分 @ 域名，顶级域至少两个字母）
pub fn validate_email(email: &str) -> Result<(), AppError> {
    if email.is_empty() || !EMAIL_REGEX.is_match(email) {
        return Err(AppError::InvalidEmail);
    }

    Ok(())
}

/// 校验密码长度（按收到的字节数计算）
pub fn validate_password(password: &str, min_length: usize) -> Result<(), AppError> {
    if password.len() < min_length {
        return Err(AppError::PasswordTooShort(min_length));
    }

    Ok(())
}
