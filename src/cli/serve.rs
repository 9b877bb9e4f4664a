//! serve 命令：静态文件服务器

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use crate::config::DEFAULT_TIMEOUT_SECS;
use crate::server::{self, ServeOptions};

/// serve 命令参数
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// 监听端口
    #[arg(long, short, default_value = "8000")]
    pub port: u16,
    /// 服务根目录（默认当前目录）
    #[arg(long, short)]
    pub directory: Option<PathBuf>,
    /// 启动后播报地址的飞书机器人 Webhook
    #[arg(long, short)]
    pub webhook: Option<String>,
    /// Webhook 签名密钥
    #[arg(long)]
    pub webhook_secret: Option<String>,
    /// 不自动打开浏览器
    #[arg(long)]
    pub no_browser: bool,
}

impl ServeArgs {
    pub fn into_options(self) -> ServeOptions {
        ServeOptions {
            port: self.port,
            directory: self.directory.unwrap_or_else(|| PathBuf::from(".")),
            webhook: self.webhook.filter(|w| !w.trim().is_empty()),
            webhook_secret: self.webhook_secret.filter(|s| !s.trim().is_empty()),
            open_browser: !self.no_browser,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// 处理 serve 命令（阻塞直到服务器停止）
pub fn handle_serve(args: ServeArgs) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime.block_on(server::run(args.into_options()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_options_defaults() {
        let args = ServeArgs {
            port: 8000,
            directory: None,
            webhook: Some(" ".to_string()),
            webhook_secret: None,
            no_browser: false,
        };
        let options = args.into_options();
        assert_eq!(options.directory, PathBuf::from("."));
        assert!(options.webhook.is_none());
        assert!(options.open_browser);
    }
}
