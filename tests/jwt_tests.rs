//! 令牌管理器测试
//!
//! 测试令牌生成、验证和失败折叠为单一错误

use chrono::Utc;
use task_auth::{
    auth::{Claims, TokenManager},
    error::AppError,
};
use uuid::Uuid;

mod common;
use common::{create_test_config, TEST_SECRET};

fn claims_with_window(iat_offset: i64, exp_offset: i64) -> Claims {
    let now = Utc::now().timestamp();
    Claims {
        sub: Uuid::new_v4().to_string(),
        email: "user@example.com".to_string(),
        iat: now + iat_offset,
        exp: now + exp_offset,
    }
}

#[test]
fn test_token_manager_from_config() {
    let manager = TokenManager::from_config(&create_test_config()).unwrap();
    assert_eq!(manager.lifetime_secs(), 3600);
}

#[test]
fn test_expires_at_is_issued_at_plus_lifetime() {
    let manager = TokenManager::new(TEST_SECRET, 48).unwrap();
    let token = manager.generate_token(&Uuid::new_v4(), "user@example.com").unwrap();

    let claims = manager.validate_token(&token).unwrap();
    assert_eq!(claims.exp - claims.iat, 48 * 3600);
    assert!((claims.iat - Utc::now().timestamp()).abs() <= 5);
}

#[test]
fn test_manually_expired_token_rejected() {
    let manager = TokenManager::new(TEST_SECRET, 24).unwrap();
    let token = manager.sign(&claims_with_window(-120, -1)).unwrap();

    assert!(matches!(manager.validate_token(&token), Err(AppError::InvalidToken)));
}

#[test]
fn test_future_expiry_accepted() {
    let manager = TokenManager::new(TEST_SECRET, 24).unwrap();
    let token = manager.sign(&claims_with_window(0, 60)).unwrap();

    assert!(manager.validate_token(&token).is_ok());
}

#[test]
fn test_other_secret_rejected_identically_to_expired() {
    let manager = TokenManager::new(TEST_SECRET, 24).unwrap();
    let forger = TokenManager::new("a-completely-different-secret-of-32+", 24).unwrap();

    let forged = forger.generate_token(&Uuid::new_v4(), "user@example.com").unwrap();
    let expired = manager.sign(&claims_with_window(-120, -1)).unwrap();

    let forged_err = manager.validate_token(&forged).unwrap_err();
    let expired_err = manager.validate_token(&expired).unwrap_err();

    assert_eq!(forged_err.kind(), expired_err.kind());
    assert_eq!(forged_err.user_message(), expired_err.user_message());
}

#[test]
fn test_tampered_payload_rejected() {
    let manager = TokenManager::new(TEST_SECRET, 24).unwrap();
    let token = manager.generate_token(&Uuid::new_v4(), "user@example.com").unwrap();
    let other = manager.generate_token(&Uuid::new_v4(), "other@example.com").unwrap();

    // 交换两个令牌的载荷段
    let parts: Vec<&str> = token.split('.').collect();
    let other_parts: Vec<&str> = other.split('.').collect();
    let tampered = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);

    assert!(matches!(manager.validate_token(&tampered), Err(AppError::InvalidToken)));
}

#[test]
fn test_unsigned_token_rejected() {
    let manager = TokenManager::new(TEST_SECRET, 24).unwrap();
    let token = manager.generate_token(&Uuid::new_v4(), "user@example.com").unwrap();

    // alg=none header: {"alg":"none","typ":"JWT"}
    let payload = token.split('.').nth(1).unwrap();
    let unsigned = format!("eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.{}.", payload);

    assert!(matches!(manager.validate_token(&unsigned), Err(AppError::InvalidToken)));
}

#[test]
fn test_malformed_tokens_rejected() {
    let manager = TokenManager::new(TEST_SECRET, 24).unwrap();

    for token in ["", "invalid.jwt.token", "abc", "a.b", "...."] {
        assert!(
            matches!(manager.validate_token(token), Err(AppError::InvalidToken)),
            "{token:?}"
        );
    }
}

#[test]
fn test_concurrent_validation_shares_manager() {
    let manager = std::sync::Arc::new(TokenManager::new(TEST_SECRET, 24).unwrap());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let manager = manager.clone();
            std::thread::spawn(move || {
                let email = format!("user{}@example.com", i);
                let token = manager.generate_token(&Uuid::new_v4(), &email).unwrap();
                manager.validate_token(&token).unwrap().email == email
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
}
