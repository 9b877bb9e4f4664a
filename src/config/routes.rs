//! 路径前缀 → 通知目标路由表
//!
//! ```text
//! uikit/=WEBHOOK_UIKIT
//! docs/=WEBHOOK_DOCS,WEBHOOK_ALL
//! ```

use anyhow::{bail, Result};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, warn};

use super::kv;

/// 目标 ID 必须是合法的环境变量名
static TARGET_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// 校验目标 ID
pub fn is_valid_target_id(id: &str) -> bool {
    TARGET_ID_PATTERN.is_match(id)
}

/// 单条路由规则
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub prefix: String,
    pub targets: Vec<String>,
}

/// 路由表
#[derive(Debug, Clone, Default)]
pub struct Routes {
    routes: Vec<Route>,
}

impl Routes {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// 从 `key=value` 条目构造
    pub fn from_entries(entries: Vec<(String, String)>) -> Result<Self> {
        let mut routes = Vec::with_capacity(entries.len());

        for (prefix, value) in entries {
            let targets: Vec<String> = value
                .split(',')
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .map(|t| t.to_string())
                .collect();

            if targets.is_empty() {
                bail!("prefix {:?} has no target", prefix);
            }
            if let Some(bad) = targets.iter().find(|t| !is_valid_target_id(t)) {
                bail!("prefix {:?}: invalid target id {:?}", prefix, bad);
            }

            routes.push(Route { prefix, targets });
        }

        Ok(Self { routes })
    }

    /// 加载路由文件，失败时返回空路由表
    pub fn load(path: &Path) -> Self {
        match kv::load(path).and_then(Self::from_entries) {
            Ok(routes) => {
                debug!(path = %path.display(), count = routes.len(), "Loaded routes");
                routes
            }
            Err(e) => {
                warn!(path = %path.display(), error = %format!("{:#}", e), "Routes unavailable, no file-based targets");
                Self::default()
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(k: &str, v: &str) -> (String, String) {
        (k.to_string(), v.to_string())
    }

    #[test]
    fn test_target_id_validation() {
        assert!(is_valid_target_id("WEBHOOK_A"));
        assert!(is_valid_target_id("_hook2"));
        assert!(!is_valid_target_id("2HOOK"));
        assert!(!is_valid_target_id("WEB-HOOK"));
        assert!(!is_valid_target_id(""));
    }

    #[test]
    fn test_from_entries_splits_target_list() {
        let routes = Routes::from_entries(vec![entry("docs/", "WEBHOOK_DOCS, WEBHOOK_ALL")]).unwrap();
        let route = routes.iter().next().unwrap();
        assert_eq!(route.prefix, "docs/");
        assert_eq!(route.targets, vec!["WEBHOOK_DOCS", "WEBHOOK_ALL"]);
    }

    #[test]
    fn test_from_entries_rejects_empty_target() {
        assert!(Routes::from_entries(vec![entry("docs/", " , ")]).is_err());
    }

    #[test]
    fn test_from_entries_rejects_invalid_target() {
        assert!(Routes::from_entries(vec![entry("docs/", "https://example.com/hook")]).is_err());
    }

    #[test]
    fn test_load_invalid_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routes.conf");
        std::fs::write(&path, "uikit/=WEBHOOK A\n").unwrap();
        assert!(Routes::load(&path).is_empty());
    }
}
