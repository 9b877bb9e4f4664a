//! GitHub 账号 → 飞书用户 ID 映射

use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

use super::kv;

/// 创建者在卡片中的显示方式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreatorName {
    /// 映射到消息平台用户，渲染为 @ 提及
    Mention(String),
    /// 未映射，直接使用原始账号
    Raw(String),
}

impl CreatorName {
    /// 渲染为 lark_md 文本
    pub fn to_markdown(&self) -> String {
        match self {
            CreatorName::Mention(id) => format!("<at id={}></at>", id),
            CreatorName::Raw(actor) => actor.clone(),
        }
    }
}

/// 用户映射表，启动时加载一次，之后只读
#[derive(Debug, Clone, Default)]
pub struct UserMapping {
    users: HashMap<String, String>,
}

impl UserMapping {
    pub fn new(users: HashMap<String, String>) -> Self {
        Self { users }
    }

    /// 从 `key=value` 文件加载
    ///
    /// 文件缺失或格式错误时记录日志并返回空映射。
    pub fn load(path: &Path) -> Self {
        match kv::load(path) {
            Ok(entries) => {
                let users: HashMap<String, String> = entries
                    .into_iter()
                    .filter(|(_, platform_id)| !platform_id.is_empty())
                    .collect();
                debug!(path = %path.display(), count = users.len(), "Loaded user mapping");
                Self { users }
            }
            Err(e) => {
                warn!(path = %path.display(), error = %format!("{:#}", e), "User mapping unavailable, using empty mapping");
                Self::default()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// 查找消息平台 ID
    pub fn platform_id(&self, actor: &str) -> Option<&str> {
        self.users.get(actor).map(|s| s.as_str())
    }

    /// 解析创建者显示名，找不到时回退为原始账号
    pub fn resolve(&self, actor: &str) -> CreatorName {
        match self.platform_id(actor) {
            Some(id) => CreatorName::Mention(id.to_string()),
            None => CreatorName::Raw(actor.to_string()),
        }
    }
}
