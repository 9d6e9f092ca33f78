use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::{CaptchaVerifier, JwtService};
use crate::core::{Config, ServerError};
use crate::db::DbService;
use crate::loyalty::LoyaltyLedger;
use crate::orders::OrderLifecycle;
use crate::reports::ReportService;
use crate::services::email::{SharedMailer, mailer_from_config};
use crate::services::ImageStore;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 克隆成本低：数据库句柄与各服务内部均为引用计数。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | Surreal<Db> | 嵌入式数据库 |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
/// | captcha | CaptchaVerifier | 登录人机验证 |
/// | mailer | SharedMailer | 邮件发送 |
/// | images | ImageStore | 上传图片存储 |
/// | lifecycle | OrderLifecycle | 订单状态变更 |
/// | loyalty | LoyaltyLedger | 会员积分 |
/// | reports | ReportService | 报表 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式数据库 (SurrealDB)
    pub db: Surreal<Db>,
    /// JWT 认证服务 (Arc 共享所有权)
    pub jwt_service: Arc<JwtService>,
    pub captcha: CaptchaVerifier,
    pub mailer: SharedMailer,
    pub images: ImageStore,
    pub lifecycle: OrderLifecycle,
    pub loyalty: LoyaltyLedger,
    pub reports: ReportService,
}

impl ServerState {
    /// 用已打开的数据库和邮件实现组装状态
    ///
    /// 通常使用 [`initialize()`](Self::initialize)；测试中用于注入邮件实现。
    pub fn new(config: Config, db: Surreal<Db>, mailer: SharedMailer) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let captcha = CaptchaVerifier::new(config.recaptcha_secret.clone(), config.is_development());
        let images = ImageStore::new(config.uploads_dir());
        let lifecycle = OrderLifecycle::new(db.clone(), mailer.clone(), config.bakery_name.clone());
        let loyalty = LoyaltyLedger::new(db.clone());
        let reports = ReportService::new(db.clone(), config.report_epoch, config.business_timezone);

        Self {
            config,
            db,
            jwt_service,
            captcha,
            mailer,
            images,
            lifecycle,
            loyalty,
            reports,
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构 (database/, uploads/)
    /// 2. 数据库 (work_dir/database)
    /// 3. 邮件发送 (SMTP 或仅日志)
    pub async fn initialize(config: &Config) -> Result<Self, ServerError> {
        tokio::fs::create_dir_all(config.database_dir()).await?;
        tokio::fs::create_dir_all(config.uploads_dir()).await?;

        let db_service = DbService::new(config.database_dir()).await?;
        let mailer = mailer_from_config(config.email.as_ref())
            .map_err(|e| ServerError::Email(e.to_string()))?;

        let state = Self::new(config.clone(), db_service.db, mailer);

        if !state.captcha.is_configured() {
            if config.is_development() {
                tracing::warn!("RECAPTCHA_SECRET_KEY not set, captcha check disabled (development)");
            } else {
                tracing::error!("RECAPTCHA_SECRET_KEY not set, logins will be refused");
            }
        }
        if config.is_production() && config.cors_origin.is_none() {
            tracing::warn!("CORS_ORIGIN not set in production, any origin is allowed");
        }

        Ok(state)
    }

    /// 获取数据库句柄
    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    /// 获取 JWT 服务
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }
}
