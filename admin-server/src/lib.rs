//! Bakery Admin Server - 烘焙店管理后台
//!
//! # 架构概述
//!
//! 后台管理面板的 HTTP 服务端：
//!
//! - **数据库** (`db`): 嵌入式 SurrealDB 存储 (管理员、商品、顾客、订单、交易、会员)
//! - **认证** (`auth`): reCAPTCHA + Argon2 + JWT
//! - **订单** (`orders`): 状态变更、履约副作用、通知邮件
//! - **会员** (`loyalty`): 完成订单计数与优惠资格
//! - **报表** (`reports`): 按日/周/月汇总已完成交易
//! - **HTTP API** (`api`): RESTful API 接口与 SPA 静态文件
//!
//! # 模块结构
//!
//! ```text
//! admin-server/src/
//! ├── core/          # 配置、状态、服务器、启动错误
//! ├── auth/          # JWT、密码、人机验证、认证中间件
//! ├── db/            # 数据库层 (models + repository)
//! ├── orders/        # 订单状态变更
//! ├── loyalty/       # 会员积分
//! ├── reports/       # 报表
//! ├── services/      # 邮件、图片存储
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 错误、日志、时间、校验
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod loyalty;
pub mod orders;
pub mod reports;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerError, ServerState};
pub use utils::{AppError, AppResponse, AppResult};

// Re-export logger functions
pub use utils::logger::init_logger_with_file;

// Security logging macro
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 进程启动准备: 读取 `.env`，初始化日志
///
/// `LOG_LEVEL` / `LOG_DIR` 在这里直接读取，日志要先于配置解析就绪。
pub fn setup_environment() -> std::io::Result<()> {
    // .env 不存在时忽略
    let _ = dotenv::dotenv();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok().filter(|d| !d.trim().is_empty());
    if let Some(dir) = &log_dir {
        std::fs::create_dir_all(dir)?;
    }

    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());
    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
    ____        __                  
   / __ )____ _/ /_____  _______  __
  / __  / __ `/ //_/ _ \/ ___/ / / /
 / /_/ / /_/ / ,< /  __/ /  / /_/ / 
/_____/\__,_/_/|_|\___/_/   \__, /  
                           /____/   
         admin server v{}
    "#,
        env!("CARGO_PKG_VERSION")
    );
}
