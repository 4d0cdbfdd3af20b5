//! 认证模块

pub mod jwt;
pub mod middleware;
pub mod password;
pub mod policy;

pub use jwt::{Claims, TokenManager};
pub use middleware::{authenticate, extract_token, jwt_auth_middleware, AuthContext};
pub use password::PasswordHasher;
pub use policy::{validate_email, validate_password, PasswordPolicy};
