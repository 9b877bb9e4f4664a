// src/cli/notify.rs
//! notify 命令：读取 CI 事件 → 解析目标 → 构建卡片 → 逐个发送
//!
//! 事件解析失败是致命错误；发送失败只记录日志，命令仍然成功退出。

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::{error, info};

use crate::config::{ConfigOverrides, Environment, NotifyConfig};
use crate::event::read_event_from_env;
use crate::notification::{
    build_card, explicit_targets, parse_changed_files, parse_changed_files_env, resolve_targets,
    NotificationDispatcher, NotificationTarget, SendResult, WebhookMessage,
};

/// 不按文件路由时的默认目标
pub const DEFAULT_TARGET: &str = "FEISHU_WEBHOOK";

/// 变更文件列表环境变量（换行、空白或逗号分隔）
pub const CHANGED_FILES_ENV: &str = "CHANGED_FILES";

/// notify 命令参数
#[derive(Args, Debug, Clone, Default)]
pub struct NotifyArgs {
    /// 事件名（默认读取 GITHUB_EVENT_NAME）
    #[arg(long)]
    pub event_name: Option<String>,
    /// 事件 payload 文件（默认读取 GITHUB_EVENT_PATH）
    #[arg(long)]
    pub event_path: Option<PathBuf>,
    /// 变更文件列表（每行一个路径，可含空格）；未指定时读取 CHANGED_FILES
    #[arg(long)]
    pub changed_files: Option<PathBuf>,
    /// 路径前缀路由文件
    #[arg(long)]
    pub routes: Option<PathBuf>,
    /// 用户映射文件
    #[arg(long)]
    pub users: Option<PathBuf>,
    /// 没有变更文件列表时通知的目标 ID（可重复）
    #[arg(long = "target")]
    pub targets: Vec<String>,
    /// 每个请求的超时（秒）
    #[arg(long)]
    pub timeout: Option<u64>,
    /// Dry-run 模式（只打印不发送）
    #[arg(long)]
    pub dry_run: bool,
}

impl NotifyArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            user_map: self.users.clone(),
            routes: self.routes.clone(),
            timeout_secs: self.timeout,
        }
    }
}

/// 单次运行的结果
#[derive(Debug, Clone, Serialize)]
pub struct NotifyReport {
    /// 解析出的目标 ID
    pub targets: Vec<String>,
    /// 每个目标的发送结果
    #[serde(skip)]
    pub results: Vec<(String, SendResult)>,
}

impl NotifyReport {
    pub fn sent_count(&self) -> usize {
        self.results.iter().filter(|(_, r)| r.is_sent()).count()
    }
}

/// 读取变更文件列表：参数指定的文件优先，其次环境变量；都没有时返回 None
pub fn changed_files_input(path: Option<&PathBuf>, env: &Environment) -> Result<Option<Vec<String>>> {
    if let Some(path) = path {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read changed-file list {}", path.display()))?;
        return Ok(Some(parse_changed_files(&content)));
    }
    Ok(env.get(CHANGED_FILES_ENV).map(parse_changed_files_env))
}

/// 计算目标集合
pub fn select_targets(
    changed_files: Option<&[String]>,
    config: &NotifyConfig,
    explicit: &[String],
) -> BTreeSet<NotificationTarget> {
    match changed_files {
        Some(files) => resolve_targets(&config.load_routes(), files),
        None if explicit.is_empty() => explicit_targets(&[DEFAULT_TARGET]),
        None => explicit_targets(explicit),
    }
}

/// 处理 notify 命令
pub fn handle_notify(args: &NotifyArgs, env: &Environment) -> Result<NotifyReport> {
    let config = NotifyConfig::resolve(&args.overrides(), env);
    let users = config.load_user_mapping();

    let event = read_event_from_env(env, args.event_name.as_deref(), args.event_path.as_deref())?;
    info!(
        kind = ?event.kind,
        action = %event.action,
        actor = %event.actor,
        url = %event.url,
        "Received CI event"
    );

    let changed_files = changed_files_input(args.changed_files.as_ref(), env)?;
    let targets = select_targets(changed_files.as_deref(), &config, &args.targets);
    let target_ids: Vec<String> = targets.iter().map(|t| t.id().to_string()).collect();

    if targets.is_empty() {
        info!("No notification target matched, nothing to send");
        return Ok(NotifyReport {
            targets: target_ids,
            results: Vec::new(),
        });
    }

    let card = build_card(&event, &users.resolve(&event.actor));
    let message = WebhookMessage::Interactive(card);

    let results = match NotificationDispatcher::for_targets(&targets, env, config.timeout_secs) {
        Ok(dispatcher) => dispatcher.with_dry_run(args.dry_run).send_sync(&message),
        Err(e) => {
            error!(error = %e, "Cannot prepare dispatcher, dropping notifications");
            target_ids
                .iter()
                .map(|id| (id.clone(), SendResult::Failed(e.to_string())))
                .collect()
        }
    };

    let report = NotifyReport {
        targets: target_ids,
        results,
    };
    info!(
        targets = report.targets.len(),
        sent = report.sent_count(),
        "Notification run finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_changed_files_from_env() {
        let env = Environment::from_pairs([(CHANGED_FILES_ENV, "uikit/a.ts uikit/b.ts")]);
        let files = changed_files_input(None, &env).unwrap();
        assert_eq!(files, Some(vec!["uikit/a.ts".to_string(), "uikit/b.ts".to_string()]));
    }

    #[test]
    fn test_changed_files_file_keeps_spaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("changed.txt");
        std::fs::write(&path, "my docs/readme.md\nuikit/a.ts\n").unwrap();
        let env = Environment::from_pairs([(CHANGED_FILES_ENV, "ignored.ts")]);

        let files = changed_files_input(Some(&path), &env).unwrap();
        assert_eq!(
            files,
            Some(vec!["my docs/readme.md".to_string(), "uikit/a.ts".to_string()])
        );
    }

    #[test]
    fn test_changed_files_absent() {
        assert_eq!(changed_files_input(None, &Environment::default()).unwrap(), None);
    }

    #[test]
    fn test_changed_files_unreadable_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.txt");
        assert!(changed_files_input(Some(&path), &Environment::default()).is_err());
    }

    #[test]
    fn test_select_targets_defaults_to_feishu_webhook() {
        let config = NotifyConfig::default();
        let targets = select_targets(None, &config, &[]);
        let ids: Vec<_> = targets.iter().map(|t| t.id()).collect();
        assert_eq!(ids, vec![DEFAULT_TARGET]);
    }

    #[test]
    fn test_select_targets_without_routes_is_empty() {
        let config = NotifyConfig::default();
        let files = vec!["uikit/button.ts".to_string()];
        assert!(select_targets(Some(&files), &config, &["EXPLICIT".to_string()]).is_empty());
    }
}
