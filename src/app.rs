use std::sync::Arc;

use anyhow::{Context, Result};
use monitor_api::{create_app, RawHttpServer};
use monitor_config::{AppConfig, Transport};
use monitor_worker::WorkerLifecycle;
use tokio::{net::TcpListener, sync::broadcast};
use tracing::info;

/// 主应用程序
pub struct Application {
    config: AppConfig,
    lifecycle: Arc<WorkerLifecycle>,
}

impl Application {
    /// 创建新的应用实例
    pub fn new(config: AppConfig) -> Result<Self> {
        let lifecycle = WorkerLifecycle::from_config(&config).context("创建Worker生命周期失败")?;
        Ok(Self::with_lifecycle(config, Arc::new(lifecycle)))
    }

    pub fn with_lifecycle(config: AppConfig, lifecycle: Arc<WorkerLifecycle>) -> Self {
        Self { config, lifecycle }
    }

    pub fn lifecycle(&self) -> &Arc<WorkerLifecycle> {
        &self.lifecycle
    }

    /// 绑定监听地址
    pub async fn bind(&self) -> Result<TcpListener> {
        let bind_address = self.config.server.bind_address();
        TcpListener::bind(&bind_address)
            .await
            .with_context(|| format!("绑定地址失败: {bind_address}"))
    }

    /// 运行应用程序
    pub async fn run(&self, shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        let listener = self.bind().await?;
        self.serve(listener, shutdown_rx).await
    }

    /// 在已绑定的监听器上提供服务，直到收到关闭信号
    pub async fn serve(
        &self,
        listener: TcpListener,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<()> {
        let port = listener.local_addr().context("读取监听地址失败")?.port();
        let endpoint = self.startup_endpoint(port);
        let transport = self.config.server.transport;

        info!(
            worker_id = %self.lifecycle.identity().id,
            %transport,
            "Worker监听于 {}",
            endpoint
        );

        // 注册、首次心跳与定时心跳在后台进行，不阻塞服务
        let startup = {
            let lifecycle = Arc::clone(&self.lifecycle);
            tokio::spawn(async move { lifecycle.start(endpoint).await })
        };

        let shutdown = async move {
            let _ = shutdown_rx.recv().await;
            info!("HTTP服务器收到关闭信号");
        };

        let served = match transport {
            Transport::Axum => {
                let app = create_app(Arc::clone(&self.lifecycle), &self.config.server);
                axum::serve(listener, app.into_make_service())
                    .with_graceful_shutdown(shutdown)
                    .await
            }
            Transport::Hyper => {
                RawHttpServer::new(
                    listener,
                    Arc::clone(&self.lifecycle),
                    self.config.server.max_body_bytes,
                )
                .serve(shutdown)
                .await
            }
        };

        startup.abort();
        let _ = startup.await;
        self.lifecycle.stop().await;

        served.context("HTTP服务器运行失败")?;

        info!("Worker服务已停止");
        Ok(())
    }

    /// 启动时通告的地址：配置的外部地址，否则为本地监听端口
    pub fn startup_endpoint(&self, port: u16) -> String {
        let configured = self.config.worker.endpoint.trim();
        if configured.is_empty() {
            format!("http://localhost:{port}")
        } else {
            configured.to_string()
        }
    }
}
