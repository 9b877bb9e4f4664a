//! 用系统默认浏览器打开地址

use anyhow::{Context, Result};
use std::process::{Command, Stdio};

fn opener(url: &str) -> Command {
    if cfg!(target_os = "macos") {
        let mut cmd = Command::new("open");
        cmd.arg(url);
        cmd
    } else if cfg!(target_os = "windows") {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", "start", "", url]);
        cmd
    } else {
        let mut cmd = Command::new("xdg-open");
        cmd.arg(url);
        cmd
    }
}

/// 启动浏览器后立即返回，不等待浏览器退出
pub fn open(url: &str) -> Result<()> {
    let mut cmd = opener(url);
    cmd.stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("Failed to launch browser for {}", url))?;
    Ok(())
}
