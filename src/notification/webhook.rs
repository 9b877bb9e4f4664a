//! 飞书自定义机器人 Webhook 渠道
//!
//! 每次发送是一次独立的 POST，不重试。飞书在 HTTP 200 时通过 `code` 字段返回业务错误。

use anyhow::{anyhow, Result};
use chrono::Utc;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use super::channel::{NotificationChannel, SendResult};
use super::message::{Signature, WebhookMessage};
use crate::config::DEFAULT_TIMEOUT_SECS;

/// Webhook 渠道配置
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// 渠道名（目标 ID，用于日志）
    pub name: String,
    /// Webhook 地址
    pub url: String,
    /// 签名密钥（机器人开启签名校验时需要）
    pub secret: Option<String>,
    /// 超时时间 (秒)
    pub timeout_secs: u64,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            name: "webhook".to_string(),
            url: String::new(),
            secret: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Webhook 响应，新旧两种字段都可能出现
#[derive(Debug, Default, Deserialize)]
pub struct WebhookResponse {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default, rename = "StatusCode")]
    pub status_code: Option<i64>,
    #[serde(default, rename = "StatusMessage")]
    pub status_message: Option<String>,
}

impl WebhookResponse {
    /// 非零业务错误码及说明
    pub fn error(&self) -> Option<(i64, String)> {
        if let Some(code) = self.code.filter(|c| *c != 0) {
            return Some((code, self.msg.clone().unwrap_or_default()));
        }
        self.status_code
            .filter(|c| *c != 0)
            .map(|code| (code, self.status_message.clone().unwrap_or_default()))
    }
}

/// 创建带超时的 HTTP 客户端
pub fn build_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))
}

/// 飞书 Webhook 渠道
#[derive(Debug)]
pub struct WebhookChannel {
    client: Client,
    config: WebhookConfig,
}

impl WebhookChannel {
    /// 创建新的 Webhook 渠道
    pub fn new(config: WebhookConfig) -> Result<Self> {
        let client = build_client(config.timeout_secs)?;
        Self::with_client(client, config)
    }

    /// 复用已有的 HTTP 客户端
    pub fn with_client(client: Client, config: WebhookConfig) -> Result<Self> {
        if config.url.trim().is_empty() {
            return Err(anyhow!("webhook url is required"));
        }
        Ok(Self { client, config })
    }

    fn post(&self, message: &WebhookMessage) -> Result<SendResult> {
        let signature = self
            .config
            .secret
            .as_deref()
            .map(|secret| Signature::new(secret, Utc::now().timestamp()))
            .transpose()?;
        let payload = message.to_payload(signature.as_ref())?;

        debug!(
            target_id = %self.config.name,
            msg_type = message.msg_type(),
            signed = signature.is_some(),
            "Posting to webhook"
        );

        let response = self
            .client
            .post(&self.config.url)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .map_err(|e| anyhow!("HTTP request failed: {}", e))?;

        let status = response.status();
        let body = match response.text() {
            Ok(body) => body,
            Err(e) => {
                return Ok(SendResult::Failed(format!(
                    "HTTP {}: failed to read response body: {}",
                    status, e
                )))
            }
        };

        if !status.is_success() {
            return Ok(SendResult::Failed(format!("HTTP {}: {}", status, body)));
        }

        let parsed: WebhookResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!(target_id = %self.config.name, error = %e, "Response body is not JSON, treating as accepted");
                WebhookResponse::default()
            }
        };
        match parsed.error() {
            Some((code, msg)) => Ok(SendResult::Failed(format!("webhook error {}: {}", code, msg))),
            None => Ok(SendResult::Sent),
        }
    }
}

impl NotificationChannel for WebhookChannel {
    fn name(&self) -> &str {
        &self.config.name
    }

    /// 失败由分发器统一记录日志
    fn send(&self, message: &WebhookMessage) -> Result<SendResult> {
        let result = self.post(message)?;
        if result.is_sent() {
            info!(target_id = %self.config.name, "Message sent successfully");
        }
        Ok(result)
    }
}
