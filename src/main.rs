//! 认证服务主入口

use std::{future::IntoFuture, sync::Arc};
use task_auth::{
    config::AppConfig,
    db,
    handlers::health,
    repository::{AccountStore, InMemoryAccountRepository, PgAccountRepository},
    routes, telemetry,
};
use tokio::net::TcpListener;
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ===== CLI 参数处理 =====
    let mut use_memory_store = false;

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--version" => {
                println!("task-auth {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" => {
                print_help();
                return Ok(());
            }
            "--memory-store" => use_memory_store = true,
            _ => {
                eprintln!("未知参数: {}", arg);
                print_help();
                std::process::exit(1);
            }
        }
    }

    // 加载 .env 文件（开发环境）
    // 生产环境应该直接设置环境变量，不依赖 .env 文件
    dotenv::from_filename(".env.local").ok();
    dotenv::dotenv().ok();

    health::set_start_time();

    // 1. 加载配置
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        anyhow::anyhow!("Failed to load configuration: {}", e)
    })?;

    // 2. 初始化日志
    telemetry::init_telemetry(&config.logging);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "task-auth starting...");

    // 3. 账户存储
    let store: Arc<dyn AccountStore> = if use_memory_store {
        tracing::warn!("Using in-memory account store, data is lost on restart");
        Arc::new(InMemoryAccountRepository::new())
    } else {
        let pool = db::init(&config.database).await?;
        tracing::info!("Database initialized");
        Arc::new(PgAccountRepository::new(pool))
    };

    // 4. 构建应用状态与路由
    let app_state = task_auth::build_state(&config, store)?;
    let app = routes::create_router(app_state);

    // 5. 启动服务器
    let addr = &config.server.addr;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(addr = %addr, "Server listening");

    // 6. 优雅关闭
    let shutdown_timeout = config.server.graceful_shutdown_timeout_secs;
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .into_future();

    tokio::select! {
        result = server => result?,
        _ = async {
            shutdown_signal().await;
            tokio::time::sleep(tokio::time::Duration::from_secs(shutdown_timeout)).await;
        } => {
            tracing::warn!("Graceful shutdown timeout reached, forcing exit");
        }
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// 优雅关闭信号处理
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Ctrl+C received, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Terminate signal received, starting graceful shutdown");
        },
    }
}

/// 打印帮助信息
fn print_help() {
    println!("task-auth {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("用法: task-auth [选项]");
    println!();
    println!("选项:");
    println!("  --version        打印版本信息并退出");
    println!("  --help           打印此帮助信息并退出");
    println!("  --memory-store   使用内存账户存储（本地调试，不连接数据库）");
    println!();
    println!("环境变量:");
    println!("  所有配置通过 TASK_ 前缀的环境变量完成，嵌套字段用 __ 分隔");
    println!("  例如 TASK_SECURITY__JWT_SECRET, TASK_DATABASE__URL");
}
