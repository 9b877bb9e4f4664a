//! 通知渠道 trait 定义

use anyhow::Result;

use super::message::WebhookMessage;

/// 发送结果
#[derive(Debug, Clone, PartialEq)]
pub enum SendResult {
    /// 发送成功
    Sent,
    /// 跳过（dry-run、缺少 webhook 地址等）
    Skipped(String),
    /// 发送失败（已记录日志，通知丢弃）
    Failed(String),
}

impl SendResult {
    pub fn is_sent(&self) -> bool {
        matches!(self, SendResult::Sent)
    }
}

/// 通知渠道 trait
pub trait NotificationChannel: Send + Sync {
    /// 渠道名称（用于日志）
    fn name(&self) -> &str;

    /// 同步发送消息
    fn send(&self, message: &WebhookMessage) -> Result<SendResult>;
}
