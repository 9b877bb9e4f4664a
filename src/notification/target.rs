//! 通知目标解析
//!
//! 目标 ID 同时也是环境变量名：`<ID>` 存放 webhook 地址，`<ID>_SECRET` 存放签名密钥。
//! 解析结果使用集合去重，同一目标每次运行最多通知一次。

use std::collections::BTreeSet;
use tracing::{debug, warn};

use crate::config::{routes, Environment, Routes};

/// 签名密钥环境变量后缀
pub const SECRET_SUFFIX: &str = "_SECRET";

/// 通知目标，由其对应的环境变量名唯一确定
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NotificationTarget {
    /// webhook 地址所在的环境变量
    pub endpoint_var: String,
    /// 签名密钥所在的环境变量
    pub key_var: String,
}

/// 从环境中取到的 webhook 地址与密钥
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub url: String,
    pub secret: Option<String>,
}

impl NotificationTarget {
    pub fn from_id(id: &str) -> Self {
        let id = id.trim();
        Self {
            endpoint_var: id.to_string(),
            key_var: format!("{}{}", id, SECRET_SUFFIX),
        }
    }

    pub fn id(&self) -> &str {
        &self.endpoint_var
    }

    /// 读取 webhook 地址，未配置时返回 None
    pub fn endpoint(&self, env: &Environment) -> Option<Endpoint> {
        let url = env.get(&self.endpoint_var)?.trim().to_string();
        Some(Endpoint {
            url,
            secret: env.get_owned(&self.key_var),
        })
    }
}

/// 拆分变更文件列表文件：每行一个路径，路径中可以有空格和逗号
pub fn parse_changed_files(text: &str) -> Vec<String> {
    collect_paths(text.lines())
}

/// 拆分 `CHANGED_FILES` 环境变量：换行、空白或逗号都是分隔符
///
/// 含空格或逗号的路径只能通过列表文件传入。
pub fn parse_changed_files_env(value: &str) -> Vec<String> {
    collect_paths(value.split(|c: char| c.is_whitespace() || c == ','))
}

fn collect_paths<'a>(parts: impl Iterator<Item = &'a str>) -> Vec<String> {
    parts
        .map(normalize_path)
        .filter(|p| !p.is_empty())
        .map(|p| p.to_string())
        .collect()
}

fn normalize_path(path: &str) -> &str {
    let path = path.trim();
    path.strip_prefix("./").unwrap_or(path)
}

/// 前缀匹配：至少一个变更文件以前缀开头，目标即被选中
pub fn resolve_targets<S: AsRef<str>>(routes: &Routes, changed_files: &[S]) -> BTreeSet<NotificationTarget> {
    let mut targets = BTreeSet::new();

    for route in routes.iter() {
        let matched = changed_files
            .iter()
            .map(|f| normalize_path(f.as_ref()))
            .find(|f| f.starts_with(route.prefix.as_str()));

        if let Some(file) = matched {
            debug!(prefix = %route.prefix, file = %file, targets = ?route.targets, "Route matched");
            targets.extend(route.targets.iter().map(|id| NotificationTarget::from_id(id)));
        }
    }

    targets
}

/// 显式指定的目标（非文件路由的流程）
pub fn explicit_targets<S: AsRef<str>>(ids: &[S]) -> BTreeSet<NotificationTarget> {
    ids.iter()
        .map(|id| id.as_ref().trim())
        .filter(|id| {
            let valid = routes::is_valid_target_id(id);
            if !valid {
                warn!(target_id = %id, "Ignoring invalid target id");
            }
            valid
        })
        .map(NotificationTarget::from_id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Route;

    fn routes(rules: &[(&str, &[&str])]) -> Routes {
        Routes::new(
            rules
                .iter()
                .map(|(prefix, targets)| Route {
                    prefix: prefix.to_string(),
                    targets: targets.iter().map(|t| t.to_string()).collect(),
                })
                .collect(),
        )
    }

    fn ids(targets: &BTreeSet<NotificationTarget>) -> Vec<&str> {
        targets.iter().map(|t| t.id()).collect()
    }

    #[test]
    fn test_uikit_change_matches_target() {
        let routes = routes(&[("uikit/", &["WEBHOOK_A"])]);
        let targets = resolve_targets(&routes, &["uikit/button.ts"]);
        assert_eq!(ids(&targets), vec!["WEBHOOK_A"]);
    }

    #[test]
    fn test_unrelated_change_matches_nothing() {
        let routes = routes(&[("uikit/", &["WEBHOOK_A"])]);
        let targets = resolve_targets(&routes, &["docs/readme.md"]);
        assert!(targets.is_empty());
    }

    #[test]
    fn test_no_changed_files() {
        let routes = routes(&[("uikit/", &["WEBHOOK_A"])]);
        let empty: [&str; 0] = [];
        assert!(resolve_targets(&routes, &empty).is_empty());
    }

    #[test]
    fn test_duplicate_matches_are_deduplicated() {
        let routes = routes(&[
            ("uikit/", &["WEBHOOK_A"]),
            ("uikit/button", &["WEBHOOK_A", "WEBHOOK_B"]),
            ("docs/", &["WEBHOOK_B"]),
        ]);
        let targets = resolve_targets(
            &routes,
            &["uikit/button.ts", "uikit/input.ts", "./docs/a.md", "docs/b.md"],
        );
        assert_eq!(ids(&targets), vec!["WEBHOOK_A", "WEBHOOK_B"]);
    }

    #[test]
    fn test_target_included_iff_prefix_matches() {
        let routes = routes(&[
            ("a/", &["HOOK_A"]),
            ("b/", &["HOOK_B"]),
            ("c/d/", &["HOOK_C"]),
        ]);
        let cases: Vec<(Vec<&str>, Vec<&str>)> = vec![
            (vec!["a/x"], vec!["HOOK_A"]),
            (vec!["b/x", "a/y"], vec!["HOOK_A", "HOOK_B"]),
            (vec!["c/x"], vec![]),
            (vec!["c/d/e"], vec!["HOOK_C"]),
            (vec!["xa/y"], vec![]),
        ];
        for (files, expected) in cases {
            assert_eq!(ids(&resolve_targets(&routes, &files)), expected, "files: {:?}", files);
        }
    }

    #[test]
    fn test_target_env_names() {
        let target = NotificationTarget::from_id("WEBHOOK_A");
        assert_eq!(target.endpoint_var, "WEBHOOK_A");
        assert_eq!(target.key_var, "WEBHOOK_A_SECRET");
    }

    #[test]
    fn test_endpoint_lookup() {
        let env = Environment::from_pairs([
            ("WEBHOOK_A", "https://open.feishu.cn/hook/a"),
            ("WEBHOOK_A_SECRET", "s3cret"),
            ("WEBHOOK_B", "https://open.feishu.cn/hook/b"),
        ]);

        let a = NotificationTarget::from_id("WEBHOOK_A").endpoint(&env).unwrap();
        assert_eq!(a.secret.as_deref(), Some("s3cret"));

        let b = NotificationTarget::from_id("WEBHOOK_B").endpoint(&env).unwrap();
        assert!(b.secret.is_none());

        assert!(NotificationTarget::from_id("WEBHOOK_C").endpoint(&env).is_none());
    }

    #[test]
    fn test_parse_changed_files_one_path_per_line() {
        let files = parse_changed_files("uikit/button.ts\n  ./docs/readme.md  \nmy docs/a, b.md\n\n");
        assert_eq!(files, vec!["uikit/button.ts", "docs/readme.md", "my docs/a, b.md"]);
    }

    #[test]
    fn test_parse_changed_files_env_separators() {
        let files = parse_changed_files_env("uikit/button.ts\n./docs/readme.md  src/a.rs,src/b.rs\n\n");
        assert_eq!(
            files,
            vec!["uikit/button.ts", "docs/readme.md", "src/a.rs", "src/b.rs"]
        );
    }

    #[test]
    fn test_path_with_space_matches_only_its_own_prefix() {
        let routes = routes(&[("docs/", &["WEBHOOK_DOCS"]), ("my docs/", &["WEBHOOK_MY"])]);
        let files = parse_changed_files("my docs/readme.md\n");
        assert_eq!(ids(&resolve_targets(&routes, &files)), vec!["WEBHOOK_MY"]);
    }

    #[test]
    fn test_explicit_targets_skip_invalid() {
        let targets = explicit_targets(&["FEISHU_WEBHOOK", "not a var", "FEISHU_WEBHOOK"]);
        assert_eq!(ids(&targets), vec!["FEISHU_WEBHOOK"]);
    }
}
