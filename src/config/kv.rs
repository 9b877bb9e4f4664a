//! 行式 `key=value` 配置文件解析
//!
//! 格式：
//! ```text
//! # 注释
//! octocat=ou_1234567890
//! uikit/=WEBHOOK_UIKIT,WEBHOOK_ALL
//! ```
//! 空行和 `#` 开头的行会被忽略；缺少 `=` 或 key 为空的行视为文件格式错误。

use anyhow::{bail, Context, Result};
use std::path::Path;

/// 解析 `key=value` 文本，保留出现顺序
pub fn parse(content: &str) -> Result<Vec<(String, String)>> {
    let mut entries = Vec::new();

    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            bail!("line {}: expected key=value, got {:?}", idx + 1, line);
        };

        let key = key.trim();
        if key.is_empty() {
            bail!("line {}: empty key", idx + 1);
        }

        entries.push((key.to_string(), value.trim().to_string()));
    }

    Ok(entries)
}

/// 读取并解析文件
pub fn load(path: &Path) -> Result<Vec<(String, String)>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse(&content).with_context(|| format!("Malformed config file {}", path.display()))
}
