use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Arg, Command};
use monitor_agent::app::Application;
use monitor_agent::common::{init_logging, load_config, wait_for_shutdown_signal};
use monitor_agent::shutdown::ShutdownManager;
use monitor_config::Transport;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // 解析命令行参数
    let matches = Command::new("monitor-agent")
        .version(env!("CARGO_PKG_VERSION"))
        .about("外部监控Worker代理")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("配置文件路径（可选，环境变量优先）"),
        )
        .arg(
            Arg::new("transport")
                .short('t')
                .long("transport")
                .value_name("TRANSPORT")
                .help("HTTP传输层")
                .value_parser(["axum", "hyper"]),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("日志级别")
                .value_parser(["trace", "debug", "info", "warn", "error"])
                .default_value("info"),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .value_name("FORMAT")
                .help("日志格式")
                .value_parser(["json", "pretty"])
                .default_value("pretty"),
        )
        .get_matches();

    let config_path = matches.get_one::<String>("config");
    let transport = matches.get_one::<String>("transport");
    let log_level = matches
        .get_one::<String>("log-level")
        .map(String::as_str)
        .unwrap_or("info");
    let log_format = matches
        .get_one::<String>("log-format")
        .map(String::as_str)
        .unwrap_or("pretty");

    // 初始化日志系统
    init_logging(log_level, log_format)?;

    info!("启动外部监控Worker");
    if let Some(path) = config_path {
        info!("配置文件: {path}");
    }

    // 加载配置
    let mut config = load_config(config_path.map(String::as_str))?;
    if let Some(transport) = transport {
        config.server.transport = transport
            .parse::<Transport>()
            .with_context(|| format!("不支持的传输层: {transport}"))?;
    }

    info!(
        worker_id = %config.worker.id,
        backend = %config.backend.base_url,
        "传输层: {}",
        config.server.transport
    );

    // 创建应用实例
    let app = Arc::new(Application::new(config)?);

    // 创建优雅关闭管理器
    let shutdown_manager = ShutdownManager::new();

    // 启动应用
    let mut app_handle = {
        let shutdown_rx = shutdown_manager.subscribe().await;
        let app = Arc::clone(&app);

        tokio::spawn(async move { app.run(shutdown_rx).await })
    };

    // 等待关闭信号，或应用提前退出（例如端口被占用）
    let exited_early = tokio::select! {
        _ = wait_for_shutdown_signal() => {
            info!("收到关闭信号，开始优雅关闭...");
            None
        }
        joined = &mut app_handle => Some(joined),
    };

    // 触发关闭
    shutdown_manager.shutdown().await;

    // 等待应用关闭，设置超时
    let joined = match exited_early {
        Some(joined) => joined,
        None => match tokio::time::timeout(Duration::from_secs(30), app_handle).await {
            Ok(joined) => joined,
            Err(_) => {
                warn!("应用关闭超时，强制退出");
                return Ok(());
            }
        },
    };

    // 运行失败时以非零状态退出
    if let Err(e) = joined.context("应用任务异常退出")? {
        error!("应用运行失败: {e:#}");
        return Err(e);
    }
    info!("应用已关闭");
    info!("外部监控Worker已退出");
    Ok(())
}
