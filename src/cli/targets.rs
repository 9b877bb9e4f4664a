//! targets 命令：只解析变更文件对应的通知目标，不读事件、不发送

use anyhow::{bail, Result};
use clap::Args;
use std::path::PathBuf;

use super::notify::changed_files_input;
use crate::config::{ConfigOverrides, Environment, NotifyConfig};
use crate::notification::resolve_targets;

/// targets 命令参数
#[derive(Args, Debug, Clone, Default)]
pub struct TargetsArgs {
    /// 变更文件列表（每行一个路径，可含空格）；未指定时读取 CHANGED_FILES
    #[arg(long)]
    pub changed_files: Option<PathBuf>,
    /// 路径前缀路由文件
    #[arg(long)]
    pub routes: Option<PathBuf>,
    /// 输出 JSON 格式
    #[arg(long)]
    pub json: bool,
}

/// 解析目标 ID 列表（已去重、排序）
pub fn handle_targets(args: &TargetsArgs, env: &Environment) -> Result<Vec<String>> {
    let overrides = ConfigOverrides {
        routes: args.routes.clone(),
        ..Default::default()
    };
    let config = NotifyConfig::resolve(&overrides, env);

    let Some(files) = changed_files_input(args.changed_files.as_ref(), env)? else {
        bail!("No changed-file list: pass --changed-files or set CHANGED_FILES");
    };

    Ok(resolve_targets(&config.load_routes(), &files)
        .iter()
        .map(|t| t.id().to_string())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_targets_with_routes_file() {
        let dir = tempfile::tempdir().unwrap();
        let routes = dir.path().join("routes.conf");
        std::fs::write(&routes, "uikit/=WEBHOOK_A\ndocs/=WEBHOOK_DOCS\n").unwrap();
        let changed = dir.path().join("changed.txt");
        std::fs::write(&changed, "uikit/button.ts\nuikit/input.ts\n").unwrap();

        let args = TargetsArgs {
            changed_files: Some(changed),
            routes: Some(routes),
            json: false,
        };
        let ids = handle_targets(&args, &Environment::default()).unwrap();
        assert_eq!(ids, vec!["WEBHOOK_A"]);
    }

    #[test]
    fn test_handle_targets_path_with_space() {
        let dir = tempfile::tempdir().unwrap();
        let routes = dir.path().join("routes.conf");
        std::fs::write(&routes, "docs/=WEBHOOK_DOCS\nmy docs/=WEBHOOK_MY\n").unwrap();
        let changed = dir.path().join("changed.txt");
        std::fs::write(&changed, "my docs/readme.md\n").unwrap();

        let args = TargetsArgs {
            changed_files: Some(changed),
            routes: Some(routes),
            json: false,
        };
        let ids = handle_targets(&args, &Environment::default()).unwrap();
        assert_eq!(ids, vec!["WEBHOOK_MY"]);
    }

    #[test]
    fn test_handle_targets_requires_changed_files() {
        let args = TargetsArgs::default();
        assert!(handle_targets(&args, &Environment::default()).is_err());
    }
}
