use chrono::NaiveDate;
use chrono_tz::Tz;
use secrecy::SecretString;

use crate::auth::JwtConfig;
use crate::auth::jwt::{MIN_SECRET_LEN, generate_printable_secret};
use crate::core::ServerError;
use crate::utils::time::{parse_date, parse_timezone};

const DEFAULT_REPORT_EPOCH: &str = "2024-12-01";

/// 服务器配置 - 管理后台的所有配置项
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 (数据库、上传图片) |
/// | HTTP_PORT | 8080 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | STATIC_DIR | dist | 前端构建产物目录 |
/// | CORS_ORIGIN | (任意) | 允许的跨域来源 |
/// | JWT_SECRET | 开发环境随机生成 | 至少 32 字符，非开发环境必填 |
/// | JWT_EXPIRATION_MINUTES | 60 | 令牌有效期 |
/// | JWT_ISSUER / JWT_AUDIENCE | bakery-admin / bakery-dashboard | 令牌签发者/受众 |
/// | RECAPTCHA_SECRET_KEY | - | reCAPTCHA 密钥 |
/// | SMTP_HOST / SMTP_PORT | - / 587 | 邮件服务器 |
/// | SMTP_USERNAME / SMTP_PASSWORD | - | 邮件认证 |
/// | SMTP_FROM | SMTP_USERNAME | 发件人 |
/// | BAKERY_NAME | Bakery Easy | 邮件中的店名 |
/// | REPORT_EPOCH | 2024-12-01 | 报表起始日期 |
/// | BUSINESS_TIMEZONE | UTC | 报表分桶时区 (IANA) |
/// | ALLOW_REGISTRATION | true | 是否开放 /register |
/// | LOG_DIR | - | 日志目录 (按天滚动) |
/// | LOG_LEVEL | info | 日志级别 (RUST_LOG 优先) |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/bakery HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库和上传文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// SPA 静态文件目录
    pub static_dir: String,
    pub cors_origin: Option<String>,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    pub recaptcha_secret: Option<SecretString>,
    /// SMTP 配置 (未配置时邮件只写日志)
    pub email: Option<EmailConfig>,
    pub bakery_name: String,
    /// 报表窗口下界 (业务时区零点)
    pub report_epoch: NaiveDate,
    pub business_timezone: Tz,
    pub allow_registration: bool,
    pub log_dir: Option<String>,
    pub log_level: String,
}

/// SMTP configuration
///
/// `Debug` is written by hand to keep the password out of logs.
#[derive(Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: SecretString,
    /// From header
    pub from_address: String,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &"[REDACTED]")
            .field("from_address", &self.from_address)
            .finish()
    }
}

impl Config {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self, ServerError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 从任意键值来源加载配置 (测试中无需修改进程环境)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ServerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let environment = var("ENVIRONMENT").unwrap_or_else(|| "development".into());

        let jwt = JwtConfig {
            secret: SecretString::from(Self::require_jwt_secret(var("JWT_SECRET"), &environment)?),
            expiration_minutes: var("JWT_EXPIRATION_MINUTES")
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            issuer: var("JWT_ISSUER").unwrap_or_else(|| "bakery-admin".into()),
            audience: var("JWT_AUDIENCE").unwrap_or_else(|| "bakery-dashboard".into()),
        };

        let email = match (var("SMTP_HOST"), var("SMTP_USERNAME"), var("SMTP_PASSWORD")) {
            (Some(smtp_host), Some(smtp_username), Some(smtp_password)) => Some(EmailConfig {
                smtp_host,
                smtp_port: var("SMTP_PORT").and_then(|p| p.parse().ok()).unwrap_or(587),
                from_address: var("SMTP_FROM").unwrap_or_else(|| smtp_username.clone()),
                smtp_username,
                smtp_password: SecretString::from(smtp_password),
            }),
            _ => None,
        };

        let epoch_raw = var("REPORT_EPOCH").unwrap_or_else(|| DEFAULT_REPORT_EPOCH.into());
        let report_epoch = parse_date(&epoch_raw)
            .map_err(|_| ServerError::Config(format!("REPORT_EPOCH '{epoch_raw}' is not YYYY-MM-DD")))?;

        let tz_raw = var("BUSINESS_TIMEZONE").unwrap_or_else(|| "UTC".into());
        let business_timezone = parse_timezone(&tz_raw)
            .map_err(|e| ServerError::Config(format!("BUSINESS_TIMEZONE: {e}")))?;

        Ok(Self {
            work_dir: var("WORK_DIR").unwrap_or_else(|| "./data".into()),
            http_port: var("HTTP_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            static_dir: var("STATIC_DIR").unwrap_or_else(|| "dist".into()),
            cors_origin: var("CORS_ORIGIN"),
            jwt,
            recaptcha_secret: var("RECAPTCHA_SECRET_KEY").map(SecretString::from),
            email,
            bakery_name: var("BAKERY_NAME").unwrap_or_else(|| "Bakery Easy".into()),
            report_epoch,
            business_timezone,
            allow_registration: var("ALLOW_REGISTRATION")
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            log_dir: var("LOG_DIR"),
            log_level: var("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            environment,
        })
    }

    /// JWT_SECRET 非开发环境必填；开发环境缺省时生成进程级随机密钥
    fn require_jwt_secret(value: Option<String>, environment: &str) -> Result<String, ServerError> {
        match value {
            Some(secret) if secret.len() < MIN_SECRET_LEN => Err(ServerError::Config(format!(
                "JWT_SECRET must be at least {MIN_SECRET_LEN} characters long"
            ))),
            Some(secret) => Ok(secret),
            None if environment == "development" => {
                tracing::warn!("JWT_SECRET not set, generating temporary key for development");
                Ok(generate_printable_secret())
            }
            None => Err(ServerError::Config(format!(
                "JWT_SECRET must be set in {environment} environment"
            ))),
        }
    }

    /// 使用自定义工作目录，其余取默认值 (测试场景)
    pub fn for_work_dir(work_dir: impl Into<String>) -> Result<Self, ServerError> {
        let work_dir = work_dir.into();
        let static_dir = format!("{work_dir}/dist");
        Self::from_lookup(move |name: &str| match name {
            "WORK_DIR" => Some(work_dir.clone()),
            "STATIC_DIR" => Some(static_dir.clone()),
            _ => None,
        })
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn database_dir(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.work_dir).join("database")
    }

    pub fn uploads_dir(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.work_dir).join("uploads")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_development_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert!(config.is_development());
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.jwt.expiration_minutes, 60);
        assert_eq!(config.report_epoch, NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
        assert_eq!(config.business_timezone, Tz::UTC);
        assert_eq!(config.bakery_name, "Bakery Easy");
        assert!(config.email.is_none());
        assert!(config.allow_registration);
    }

    #[test]
    fn test_production_requires_jwt_secret() {
        let err = Config::from_lookup(lookup(&[("ENVIRONMENT", "production")])).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));

        let short = Config::from_lookup(lookup(&[
            ("ENVIRONMENT", "production"),
            ("JWT_SECRET", "too-short"),
        ]));
        assert!(short.is_err());

        let ok = Config::from_lookup(lookup(&[
            ("ENVIRONMENT", "production"),
            ("JWT_SECRET", "0123456789abcdef0123456789abcdef"),
        ]))
        .unwrap();
        assert!(ok.is_production());
    }

    #[test]
    fn test_email_needs_host_and_credentials() {
        let partial = Config::from_lookup(lookup(&[("SMTP_HOST", "smtp.example.com")])).unwrap();
        assert!(partial.email.is_none());

        let full = Config::from_lookup(lookup(&[
            ("SMTP_HOST", "smtp.example.com"),
            ("SMTP_USERNAME", "bakery@example.com"),
            ("SMTP_PASSWORD", "app-password"),
        ]))
        .unwrap();
        let email = full.email.unwrap();
        assert_eq!(email.smtp_port, 587);
        assert_eq!(email.from_address, "bakery@example.com");
        assert!(!format!("{email:?}").contains("app-password"));
    }

    #[test]
    fn test_report_settings_validated() {
        assert!(Config::from_lookup(lookup(&[("REPORT_EPOCH", "01/12/2024")])).is_err());
        assert!(Config::from_lookup(lookup(&[("BUSINESS_TIMEZONE", "Mars/Olympus")])).is_err());

        let madrid =
            Config::from_lookup(lookup(&[("BUSINESS_TIMEZONE", "Europe/Madrid")])).unwrap();
        assert_eq!(madrid.business_timezone, chrono_tz::Europe::Madrid);
    }
}
