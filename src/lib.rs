//! pr-card-notify - 把 CI 中的 PR 事件以互动卡片推送到飞书机器人

pub mod cli;
pub mod config;
pub mod event;
pub mod notification;
pub mod server;

pub use config::{Environment, NotifyConfig, UserMapping};
pub use event::{Event, EventAction, EventKind};
pub use notification::{
    build_card, resolve_targets, Card, NotificationDispatcher, NotificationTarget, SendResult,
    WebhookMessage,
};
