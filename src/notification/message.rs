//! Webhook 消息体与签名
//!
//! 签名算法：以 `"{timestamp}\n{secret}"` 为 key 对空串做 HMAC-SHA256，再 base64 编码。

use anyhow::{anyhow, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;

use super::card::Card;

type HmacSha256 = Hmac<Sha256>;

/// 发往 webhook 的消息
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookMessage {
    /// 互动卡片
    Interactive(Card),
    /// 纯文本
    Text(String),
}

/// 签名字段
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Signature {
    pub timestamp: String,
    pub sign: String,
}

impl Signature {
    pub fn new(secret: &str, timestamp: i64) -> Result<Self> {
        Ok(Self {
            timestamp: timestamp.to_string(),
            sign: sign(secret, timestamp)?,
        })
    }
}

#[derive(Serialize)]
struct TextContent<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(tag = "msg_type", rename_all = "snake_case")]
enum Body<'a> {
    Interactive { card: &'a Card },
    Text { content: TextContent<'a> },
}

#[derive(Serialize)]
struct Payload<'a> {
    #[serde(flatten)]
    signature: Option<&'a Signature>,
    #[serde(flatten)]
    body: Body<'a>,
}

impl WebhookMessage {
    pub fn msg_type(&self) -> &'static str {
        match self {
            WebhookMessage::Interactive(_) => "interactive",
            WebhookMessage::Text(_) => "text",
        }
    }

    /// 序列化为请求体
    pub fn to_payload(&self, signature: Option<&Signature>) -> Result<serde_json::Value> {
        let body = match self {
            WebhookMessage::Interactive(card) => Body::Interactive { card },
            WebhookMessage::Text(text) => Body::Text {
                content: TextContent { text },
            },
        };
        Ok(serde_json::to_value(Payload { signature, body })?)
    }
}

/// 计算签名
pub fn sign(secret: &str, timestamp: i64) -> Result<String> {
    let key = format!("{}\n{}", timestamp, secret);
    let mac = HmacSha256::new_from_slice(key.as_bytes())
        .map_err(|e| anyhow!("Invalid signing key: {}", e))?;
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}
