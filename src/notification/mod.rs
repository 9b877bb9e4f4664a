//! 通知层 - 目标解析、卡片构建与 webhook 分发
//!
//! 流程：`target` 解析目标集合 → `card` 渲染卡片 → `dispatcher` 逐个 POST。
//!
//! # 使用示例
//! ```ignore
//! use pr_card_notify::notification::{build_card, resolve_targets, NotificationDispatcher, WebhookMessage};
//!
//! let targets = resolve_targets(&routes, &changed_files);
//! let card = build_card(&event, &users.resolve(&event.actor));
//! let dispatcher = NotificationDispatcher::for_targets(&targets, &env, 10)?;
//! dispatcher.send_sync(&WebhookMessage::Interactive(card));
//! ```

pub mod card;
pub mod channel;
pub mod dispatcher;
pub mod message;
pub mod status;
pub mod target;
pub mod webhook;

pub use card::{build_card, Card};
pub use channel::{NotificationChannel, SendResult};
pub use dispatcher::NotificationDispatcher;
pub use message::WebhookMessage;
pub use status::{lookup as status_lookup, msg, HeaderTemplate, Status};
pub use target::{
    explicit_targets, parse_changed_files, parse_changed_files_env, resolve_targets, NotificationTarget,
};
pub use webhook::{WebhookChannel, WebhookConfig};
