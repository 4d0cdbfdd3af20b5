//! 内存账户存储（测试与无 Postgres 的本地运行）

use super::account_repo::AccountStore;
use crate::{error::AppError, models::account::Account};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// 单锁保护的内存账户存储
///
/// 唯一性检查与插入在同一把写锁内完成，同一邮箱的并发注册至多成功一次
#[derive(Debug, Default)]
pub struct InMemoryAccountRepository {
    accounts: RwLock<HashMap<Uuid, Account>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已存储账户数
    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountRepository {
    async fn create(&self, account: &Account) -> Result<Account, AppError> {
        let mut accounts = self.accounts.write().await;

        if accounts.values().any(|a| a.email == account.email) {
            return Err(AppError::EmailExists);
        }
        if accounts.contains_key(&account.id) {
            return Err(AppError::Internal(format!("Duplicate account id {}", account.id)));
        }

        accounts.insert(account.id, account.clone());
        Ok(account.clone())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Account, AppError> {
        self.accounts
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::not_found("account"))
    }

    async fn get_by_email(&self, email: &str) -> Result<Account, AppError> {
        self.accounts
            .read()
            .await
            .values()
            .find(|a| a.email == email)
            .cloned()
            .ok_or_else(|| AppError::not_found("account"))
    }

    async fn update(&self, account: &Account) -> Result<Account, AppError> {
        let mut accounts = self.accounts.write().await;

        if !accounts.contains_key(&account.id) {
            return Err(AppError::not_found("account"));
        }

        // 检查邮箱唯一性（排除当前账户）
        if accounts
            .values()
            .any(|a| a.email == account.email && a.id != account.id)
        {
            return Err(AppError::EmailExists);
        }

        let mut updated = account.clone();
        updated.updated_at = Utc::now();
        accounts.insert(updated.id, updated.clone());
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.accounts
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::not_found("account"))
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn account(email: &str) -> Account {
        Account::new(email, "hashed_password".to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = InMemoryAccountRepository::new();
        let created = repo.create(&account("user@example.com")).await.unwrap();

        let by_id = repo.get_by_id(created.id).await.unwrap();
        let by_email = repo.get_by_email("user@example.com").await.unwrap();
        assert_eq!(by_id, created);
        assert_eq!(by_email, created);
    }

    #[tokio::test]
    async fn test_email_uniqueness() {
        let repo = InMemoryAccountRepository::new();
        repo.create(&account("user@example.com")).await.unwrap();

        let result = repo.create(&account("user@example.com")).await;
        assert!(matches!(result, Err(AppError::EmailExists)));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_email_is_case_sensitive() {
        let repo = InMemoryAccountRepository::new();
        repo.create(&account("user@example.com")).await.unwrap();
        repo.create(&account("User@example.com")).await.unwrap();

        assert!(repo.get_by_email("USER@example.com").await.is_err());
        assert_eq!(repo.len().await, 2);
    }

    #[tokio::test]
    async fn test_missing_account_is_not_found() {
        let repo = InMemoryAccountRepository::new();
        assert!(matches!(repo.get_by_id(Uuid::new_v4()).await, Err(AppError::NotFound(_))));
        assert!(matches!(
            repo.get_by_email("nobody@example.com").await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(repo.delete(Uuid::new_v4()).await, Err(AppError::NotFound(_))));
        assert!(matches!(
            repo.update(&account("nobody@example.com")).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_keeps_id_and_checks_email() {
        let repo = InMemoryAccountRepository::new();
        let first = repo.create(&account("first@example.com")).await.unwrap();
        repo.create(&account("second@example.com")).await.unwrap();

        let mut changed = first.clone();
        changed.password_hash = "new_hash".to_string();
        let updated = repo.update(&changed).await.unwrap();
        assert_eq!(updated.id, first.id);
        assert_eq!(updated.password_hash, "new_hash");

        changed.email = "second@example.com".to_string();
        assert!(matches!(repo.update(&changed).await, Err(AppError::EmailExists)));
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = InMemoryAccountRepository::new();
        let created = repo.create(&account("user@example.com")).await.unwrap();

        repo.delete(created.id).await.unwrap();
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_concurrent_create_same_email() {
        let repo = Arc::new(InMemoryAccountRepository::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.create(&account("race@example.com")).await })
            })
            .collect();

        let mut created = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(AppError::EmailExists) => conflicts += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }

        assert_eq!(created, 1);
        assert_eq!(conflicts, 7);
    }
}
