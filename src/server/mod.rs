//! 静态文件服务器
//!
//! 绑定端口 → 打印访问地址 → （可选）通过 webhook 播报 → 打开浏览器 → 服务直到 Ctrl+C。

pub mod browser;
pub mod listing;
pub mod local_ip;

use anyhow::{bail, Context, Result};
use axum::routing::{get, MethodRouter};
use axum::Router;
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::notification::{NotificationDispatcher, SendResult, WebhookChannel, WebhookConfig, WebhookMessage};

pub use local_ip::local_ip;

/// 服务器启动参数
#[derive(Debug, Clone)]
pub struct ServeOptions {
    pub port: u16,
    pub directory: PathBuf,
    /// 播报地址用的 webhook
    pub webhook: Option<String>,
    pub webhook_secret: Option<String>,
    pub open_browser: bool,
    pub timeout_secs: u64,
}

/// 已绑定的服务器地址信息
#[derive(Debug, Clone)]
pub struct ServerInfo {
    pub root: PathBuf,
    pub port: u16,
    pub lan_ip: IpAddr,
}

impl ServerInfo {
    pub fn local_url(&self) -> String {
        format!("http://localhost:{}", self.port)
    }

    pub fn lan_url(&self) -> String {
        format!("http://{}:{}", self.lan_ip, self.port)
    }

    /// 终端和 webhook 共用的启动信息
    pub fn banner(&self) -> String {
        format!(
            "文件服务器已启动\n服务目录: {}\n本机地址: {}\n局域网地址: {}",
            self.root.display(),
            self.local_url(),
            self.lan_url()
        )
    }
}

/// 构建路由：静态文件优先，目录无 index.html 时返回列表页
pub fn router(root: PathBuf) -> Router {
    let list_dirs: MethodRouter = get(listing::directory_listing).with_state(Arc::new(root.clone()));
    let files = ServeDir::new(root)
        .append_index_html_on_directories(true)
        .fallback(list_dirs);

    Router::new()
        .fallback_service(files)
        .layer(TraceLayer::new_for_http())
}

/// 通过 webhook 发送文本播报，失败只记录日志
pub fn announce(options: &ServeOptions, text: String) -> Vec<(String, SendResult)> {
    let Some(url) = options.webhook.clone() else {
        return Vec::new();
    };

    let config = WebhookConfig {
        name: "announce".to_string(),
        url,
        secret: options.webhook_secret.clone(),
        timeout_secs: options.timeout_secs,
    };

    let mut dispatcher = NotificationDispatcher::new();
    match WebhookChannel::new(config) {
        Ok(channel) => dispatcher.register_channel(Arc::new(channel)),
        Err(e) => {
            warn!(error = %e, "Invalid announce webhook");
            return vec![("announce".to_string(), SendResult::Failed(e.to_string()))];
        }
    }

    dispatcher.send_sync(&WebhookMessage::Text(text))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

/// 运行服务器直到 Ctrl+C
pub async fn run(options: ServeOptions) -> Result<()> {
    let root = options
        .directory
        .canonicalize()
        .with_context(|| format!("Cannot access directory {}", options.directory.display()))?;
    if !root.is_dir() {
        bail!("{} is not a directory", root.display());
    }

    let listener = TcpListener::bind(("0.0.0.0", options.port))
        .await
        .with_context(|| format!("Failed to bind port {}", options.port))?;
    let port = listener.local_addr()?.port();

    let info = ServerInfo {
        root: root.clone(),
        port,
        lan_ip: local_ip(),
    };
    println!("{}", info.banner());
    println!("\n按 Ctrl+C 停止服务器");

    if options.webhook.is_some() {
        // reqwest 阻塞客户端不能在异步上下文中创建
        let announce_options = options.clone();
        let text = info.banner();
        let results = tokio::task::spawn_blocking(move || announce(&announce_options, text))
            .await
            .context("Announce task panicked")?;
        for (name, result) in results {
            info!(channel = %name, ?result, "Announce finished");
        }
    }

    if options.open_browser {
        if let Err(e) = browser::open(&info.local_url()) {
            warn!(error = %format!("{:#}", e), "Could not open browser");
        }
    }

    info!(root = %root.display(), port, "Serving files");
    axum::serve(listener, router(root))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    println!("\n服务器已停止");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn options() -> ServeOptions {
        ServeOptions {
            port: 0,
            directory: PathBuf::from("."),
            webhook: None,
            webhook_secret: None,
            open_browser: false,
            timeout_secs: 2,
        }
    }

    #[test]
    fn test_banner_contains_urls() {
        let info = ServerInfo {
            root: PathBuf::from("/srv/www"),
            port: 8000,
            lan_ip: IpAddr::V4(Ipv4Addr::new(192, 168, 1, 20)),
        };
        let banner = info.banner();
        assert!(banner.contains("/srv/www"));
        assert!(banner.contains("http://localhost:8000"));
        assert!(banner.contains("http://192.168.1.20:8000"));
    }

    #[test]
    fn test_announce_without_webhook_is_noop() {
        assert!(announce(&options(), "hi".to_string()).is_empty());
    }

    #[test]
    fn test_announce_to_unreachable_webhook_is_logged_failure() {
        let options = ServeOptions {
            webhook: Some("http://127.0.0.1:1/hook".to_string()),
            ..options()
        };
        let results = announce(&options, "hi".to_string());
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0].1, SendResult::Failed(_)));
    }

    #[tokio::test]
    async fn test_router_serves_files_and_listing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("hello.txt"), "hello world").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub").join("note.md"), "# note").unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(dir.path().to_path_buf());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let base = format!("http://{}", addr);
        let body = reqwest::get(format!("{}/hello.txt", base))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, "hello world");

        let listing = reqwest::get(format!("{}/sub/", base))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(listing.contains("note.md"));

        let missing = reqwest::get(format!("{}/nope.txt", base)).await.unwrap();
        assert_eq!(missing.status().as_u16(), 404);
    }
}
