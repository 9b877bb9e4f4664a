//! CI 事件模型
//!
//! 事件类型在入口处一次性解码为 `EventKind` + 结构化字段，
//! 之后的路由、卡片构建都只依赖 `Event`，不再读取环境变量。

pub mod github;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::config::Environment;

pub use github::AuxFields;

/// GitHub Actions 事件名环境变量
pub const EVENT_NAME_ENV: &str = "GITHUB_EVENT_NAME";
/// GitHub Actions 事件 payload 路径环境变量
pub const EVENT_PATH_ENV: &str = "GITHUB_EVENT_PATH";

/// 事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// PR 打开 / 更新 / 关闭
    PullRequest,
    /// PR 评审
    Review,
    /// PR 或 issue 评论
    Comment,
}

impl EventKind {
    /// 从 GitHub 事件名解析
    pub fn from_event_name(name: &str) -> Result<Self> {
        match name.trim() {
            "pull_request" | "pull_request_target" => Ok(EventKind::PullRequest),
            "pull_request_review" => Ok(EventKind::Review),
            "issue_comment" | "pull_request_review_comment" => Ok(EventKind::Comment),
            other => bail!("Unsupported event type: {:?}", other),
        }
    }
}

/// 事件动作
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    Opened,
    Synchronize,
    Closed,
    Reviewed,
    Commented,
    /// 未识别的动作，保留原始字符串
    Other(String),
}

impl EventAction {
    pub fn parse(action: &str) -> Self {
        match action.trim() {
            "opened" => EventAction::Opened,
            "synchronize" => EventAction::Synchronize,
            "closed" => EventAction::Closed,
            "reviewed" | "submitted" => EventAction::Reviewed,
            "commented" | "created" => EventAction::Commented,
            other => EventAction::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EventAction::Opened => "opened",
            EventAction::Synchronize => "synchronize",
            EventAction::Closed => "closed",
            EventAction::Reviewed => "reviewed",
            EventAction::Commented => "commented",
            EventAction::Other(s) => s,
        }
    }
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 一次 CI 触发的结构化表示，解析后不可变
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventKind,
    /// 触发者账号（PR 作者 / 评审人 / 评论人）
    pub actor: String,
    pub action: EventAction,
    /// PR 或 issue 标题
    pub title: String,
    pub body: Option<String>,
    /// 卡片按钮跳转地址
    pub url: String,
    pub merged: Option<bool>,
    pub number: Option<u64>,
    /// `owner/repo`
    pub repository: Option<String>,
    /// 评审结论（approved / changes_requested / commented）
    pub review_state: Option<String>,
}

impl Event {
    /// 是否为已合并的关闭事件
    pub fn is_merged(&self) -> bool {
        self.merged.unwrap_or(false)
    }
}

/// 读取事件：事件名 + payload 文件 + 辅助环境变量
pub fn read_event(event_name: &str, payload_path: &Path, aux: &AuxFields) -> Result<Event> {
    let kind = EventKind::from_event_name(event_name)?;
    let payload = std::fs::read_to_string(payload_path)
        .with_context(|| format!("Failed to read event payload {}", payload_path.display()))?;
    let event = github::decode(kind, &payload, aux)
        .with_context(|| format!("Failed to decode {} event", event_name))?;

    debug!(kind = ?event.kind, action = %event.action, actor = %event.actor, "Event decoded");
    Ok(event)
}

/// 按 GitHub Actions 约定从环境读取事件，参数优先于环境变量
pub fn read_event_from_env(
    env: &Environment,
    event_name: Option<&str>,
    payload_path: Option<&Path>,
) -> Result<Event> {
    let event_name = match event_name {
        Some(name) => name.to_string(),
        None => env
            .get_owned(EVENT_NAME_ENV)
            .with_context(|| format!("{} is not set", EVENT_NAME_ENV))?,
    };
    let payload_path = match payload_path {
        Some(path) => path.to_path_buf(),
        None => env
            .get(EVENT_PATH_ENV)
            .map(std::path::PathBuf::from)
            .with_context(|| format!("{} is not set", EVENT_PATH_ENV))?,
    };

    read_event(&event_name, &payload_path, &AuxFields::from_env(env))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_from_name() {
        assert_eq!(EventKind::from_event_name("pull_request").unwrap(), EventKind::PullRequest);
        assert_eq!(EventKind::from_event_name("pull_request_target").unwrap(), EventKind::PullRequest);
        assert_eq!(EventKind::from_event_name("pull_request_review").unwrap(), EventKind::Review);
        assert_eq!(EventKind::from_event_name("issue_comment").unwrap(), EventKind::Comment);
        assert_eq!(
            EventKind::from_event_name("pull_request_review_comment").unwrap(),
            EventKind::Comment
        );
        assert!(EventKind::from_event_name("push").is_err());
    }

    #[test]
    fn test_event_action_parse() {
        assert_eq!(EventAction::parse("opened"), EventAction::Opened);
        assert_eq!(EventAction::parse("synchronize"), EventAction::Synchronize);
        assert_eq!(EventAction::parse("closed"), EventAction::Closed);
        assert_eq!(EventAction::parse("submitted"), EventAction::Reviewed);
        assert_eq!(EventAction::parse("created"), EventAction::Commented);
        assert_eq!(
            EventAction::parse("labeled"),
            EventAction::Other("labeled".to_string())
        );
        assert_eq!(EventAction::parse("labeled").to_string(), "labeled");
    }

    #[test]
    fn test_read_event_from_env_requires_name() {
        let env = Environment::default();
        let err = read_event_from_env(&env, None, None).unwrap_err();
        assert!(err.to_string().contains(EVENT_NAME_ENV));
    }

    #[test]
    fn test_read_event_missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_event(
            "pull_request",
            &dir.path().join("event.json"),
            &AuxFields::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_read_event_from_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("event.json");
        std::fs::write(
            &path,
            r#"{"action":"opened","pull_request":{"number":7,"title":"Add button","body":null,
                "html_url":"https://github.com/acme/ui/pull/7","user":{"login":"octocat"},"merged":false}}"#,
        )
        .unwrap();

        let env = Environment::from_pairs([
            (EVENT_NAME_ENV, "pull_request".to_string()),
            (EVENT_PATH_ENV, path.display().to_string()),
        ]);
        let event = read_event_from_env(&env, None, None).unwrap();
        assert_eq!(event.kind, EventKind::PullRequest);
        assert_eq!(event.action, EventAction::Opened);
        assert_eq!(event.number, Some(7));
    }
}
