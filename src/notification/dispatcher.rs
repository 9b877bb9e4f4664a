//! 通知分发器 - 管理多个渠道并逐个发送
//!
//! 尽力而为：单个渠道失败只记录日志，继续发送下一个，从不向调用方返回错误。

use super::channel::{NotificationChannel, SendResult};
use super::message::WebhookMessage;
use super::target::NotificationTarget;
use super::webhook::{build_client, WebhookChannel, WebhookConfig};
use crate::config::Environment;
use anyhow::Result;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{error, info, warn};

/// 通知分发器
pub struct NotificationDispatcher {
    /// 所有注册的渠道
    channels: Vec<Arc<dyn NotificationChannel>>,
    /// 已解析但无法发送的目标（名称, 原因）
    skipped: Vec<(String, String)>,
    /// 是否为 dry-run 模式
    dry_run: bool,
}

impl NotificationDispatcher {
    /// 创建新的分发器
    pub fn new() -> Self {
        Self {
            channels: Vec::new(),
            skipped: Vec::new(),
            dry_run: false,
        }
    }

    /// 设置 dry-run 模式
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// 为解析出的目标注册 webhook 渠道，共用一个 HTTP 客户端
    ///
    /// 环境中没有 webhook 地址的目标会被记录为跳过。
    pub fn for_targets(
        targets: &BTreeSet<NotificationTarget>,
        env: &Environment,
        timeout_secs: u64,
    ) -> Result<Self> {
        let mut dispatcher = Self::new();
        if targets.is_empty() {
            return Ok(dispatcher);
        }

        let client = build_client(timeout_secs)?;

        for target in targets {
            let Some(endpoint) = target.endpoint(env) else {
                warn!(target_id = %target.id(), var = %target.endpoint_var, "Webhook url not set, skipping target");
                dispatcher.skipped.push((
                    target.id().to_string(),
                    format!("{} is not set", target.endpoint_var),
                ));
                continue;
            };

            let config = WebhookConfig {
                name: target.id().to_string(),
                url: endpoint.url,
                secret: endpoint.secret,
                timeout_secs,
            };
            match WebhookChannel::with_client(client.clone(), config) {
                Ok(channel) => dispatcher.register_channel(Arc::new(channel)),
                Err(e) => {
                    warn!(target_id = %target.id(), error = %e, "Invalid webhook config, skipping target");
                    dispatcher.skipped.push((target.id().to_string(), e.to_string()));
                }
            }
        }

        Ok(dispatcher)
    }

    /// 注册渠道
    pub fn register_channel(&mut self, channel: Arc<dyn NotificationChannel>) {
        info!(channel = channel.name(), "Registering notification channel");
        self.channels.push(channel);
    }

    /// 顺序发送消息到所有渠道
    ///
    /// 每个渠道得到一份独立的消息副本；任何渠道的错误都转为 `SendResult::Failed`。
    /// dry-run 时所有解析出的目标（包括没有配置地址的）都只打印消息体。
    pub fn send_sync(&self, message: &WebhookMessage) -> Vec<(String, SendResult)> {
        if self.dry_run {
            return self
                .skipped
                .iter()
                .map(|(name, _)| name.as_str())
                .chain(self.channels.iter().map(|c| c.name()))
                .map(|name| {
                    print_preview(name, message);
                    (name.to_string(), SendResult::Skipped("dry-run".to_string()))
                })
                .collect();
        }

        let mut results: Vec<(String, SendResult)> = self
            .skipped
            .iter()
            .map(|(name, reason)| (name.clone(), SendResult::Skipped(reason.clone())))
            .collect();

        for channel in &self.channels {
            let name = channel.name().to_string();
            let message = message.clone();

            let result = match channel.send(&message) {
                Ok(r) => r,
                Err(e) => SendResult::Failed(e.to_string()),
            };
            if let SendResult::Failed(reason) = &result {
                error!(channel = %name, error = %reason, "Notification dropped");
            }

            results.push((name, result));
        }

        results
    }

    /// 获取已注册的渠道数量
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// 获取已注册的渠道名称
    pub fn channel_names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.name()).collect()
    }
}

fn print_preview(name: &str, message: &WebhookMessage) {
    let preview = message
        .to_payload(None)
        .and_then(|p| Ok(serde_json::to_string_pretty(&p)?))
        .unwrap_or_else(|e| format!("<unserializable: {}>", e));
    println!("[DRY-RUN] Would send to {}:\n{}", name, preview);
}

impl Default for NotificationDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
