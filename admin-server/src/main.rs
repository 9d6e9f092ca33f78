use admin_server::{Config, Server, ServerState, print_banner, setup_environment};
use anyhow::Context;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 设置环境 (dotenv, 日志)
    setup_environment().context("Failed to prepare environment")?;

    // 打印横幅
    print_banner();

    tracing::info!("Bakery admin server starting...");

    // 2. 加载配置
    let config = Config::from_env().context("Invalid configuration")?;
    tracing::info!(
        environment = %config.environment,
        work_dir = %config.work_dir,
        port = config.http_port,
        "Configuration loaded"
    );

    // 3. 初始化服务器状态
    let state = ServerState::initialize(&config)
        .await
        .context("Failed to initialize server state")?;

    // 4. 启动 HTTP 服务器
    let server = Server::with_state(config, state);

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
