//! 认证模块
//!
//! - [`JwtService`] - JWT 令牌服务
//! - [`CurrentUser`] - 当前管理员上下文
//! - [`require_auth`] - 认证中间件
//! - [`CaptchaVerifier`] - 登录人机验证
//! - [`password`] - argon2 密码哈希

pub mod captcha;
pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use captcha::{CaptchaError, CaptchaVerifier};
pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::require_auth;
