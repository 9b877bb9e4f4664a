//! 配置层
//!
//! 配置文件查找优先级（从高到低）：
//! 1. 命令行参数（`--users` / `--routes`）
//! 2. 环境变量 `PRN_USER_MAP` / `PRN_ROUTES`
//! 3. 仓库内默认位置 `.github/notify/users.conf` / `.github/notify/routes.conf`
//! 4. 用户配置目录 `<config_dir>/pr-card-notify/users.conf` / `routes.conf`
//!
//! 所有配置在启动时构造一次，之后以引用传递。

pub mod env;
pub mod kv;
pub mod routes;
pub mod user_mapping;

pub use env::Environment;
pub use routes::{Route, Routes};
pub use user_mapping::{CreatorName, UserMapping};

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// 默认请求超时（秒）
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// 用户映射文件环境变量
pub const USER_MAP_ENV: &str = "PRN_USER_MAP";
/// 路由文件环境变量
pub const ROUTES_ENV: &str = "PRN_ROUTES";
/// 超时环境变量
pub const TIMEOUT_ENV: &str = "PRN_TIMEOUT_SECS";

const REPO_USER_MAP: &str = ".github/notify/users.conf";
const REPO_ROUTES: &str = ".github/notify/routes.conf";
const APP_DIR: &str = "pr-card-notify";

/// 命令行覆盖项
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub user_map: Option<PathBuf>,
    pub routes: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
}

/// 通知流程配置
#[derive(Debug, Clone)]
pub struct NotifyConfig {
    /// 用户映射文件
    pub user_map_path: Option<PathBuf>,
    /// 路由文件
    pub routes_path: Option<PathBuf>,
    /// 每个 webhook 请求的超时（秒）
    pub timeout_secs: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            user_map_path: None,
            routes_path: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl NotifyConfig {
    /// 以当前目录为仓库根解析配置
    pub fn resolve(overrides: &ConfigOverrides, env: &Environment) -> Self {
        let root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::resolve_in(overrides, env, &root)
    }

    /// 以指定目录为仓库根解析配置
    pub fn resolve_in(overrides: &ConfigOverrides, env: &Environment, repo_root: &Path) -> Self {
        let user_map_path = resolve_path(
            overrides.user_map.as_deref(),
            env.get(USER_MAP_ENV),
            &repo_root.join(REPO_USER_MAP),
            "users.conf",
        );
        let routes_path = resolve_path(
            overrides.routes.as_deref(),
            env.get(ROUTES_ENV),
            &repo_root.join(REPO_ROUTES),
            "routes.conf",
        );

        let timeout_secs = overrides.timeout_secs.unwrap_or_else(|| {
            match env.get(TIMEOUT_ENV).map(|v| v.trim().parse::<u64>()) {
                Some(Ok(secs)) if secs > 0 => secs,
                Some(_) => {
                    warn!(var = TIMEOUT_ENV, "Invalid timeout, using default");
                    DEFAULT_TIMEOUT_SECS
                }
                None => DEFAULT_TIMEOUT_SECS,
            }
        });

        debug!(?user_map_path, ?routes_path, timeout_secs, "Resolved notify config");

        Self {
            user_map_path,
            routes_path,
            timeout_secs,
        }
    }

    /// 加载用户映射，没有配置文件时为空映射
    pub fn load_user_mapping(&self) -> UserMapping {
        match &self.user_map_path {
            Some(path) => UserMapping::load(path),
            None => {
                debug!("No user mapping configured");
                UserMapping::default()
            }
        }
    }

    /// 加载路由表，没有配置文件时为空
    pub fn load_routes(&self) -> Routes {
        match &self.routes_path {
            Some(path) => Routes::load(path),
            None => {
                debug!("No routes configured");
                Routes::default()
            }
        }
    }
}

/// 按优先级查找配置文件
///
/// 显式指定（参数或环境变量）的路径即使不存在也会返回，由加载方记录错误。
fn resolve_path(
    flag: Option<&Path>,
    env_value: Option<&str>,
    repo_default: &Path,
    file_name: &str,
) -> Option<PathBuf> {
    if let Some(path) = flag {
        return Some(path.to_path_buf());
    }
    if let Some(value) = env_value {
        return Some(PathBuf::from(value.trim()));
    }
    if repo_default.exists() {
        return Some(repo_default.to_path_buf());
    }
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR).join(file_name))
        .filter(|path| path.exists())
}
