//! Account domain models

use crate::{auth::policy, error::AppError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Registered account
///
/// Never serialized to clients; render through [`AccountResponse`].
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Build a new account with a fresh ID; the email must pass the policy
    pub fn new(email: &str, password_hash: String) -> Result<Self, AppError> {
        policy::validate_email(email)?;

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Register request
///
/// Missing fields deserialize as empty strings and are rejected by the service.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: u64,
}

/// Account response (without sensitive data)
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            email: account.email,
            created_at: account.created_at,
        }
    }
}

/// Current identity response
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: Uuid,
    pub email: String,
}
