//! pr-card-notify CLI
//!
//! 把 CI 中的 PR 事件以互动卡片发送到飞书机器人，附带一个简单的静态文件服务器。

use anyhow::Result;
use clap::{Parser, Subcommand};
use pr_card_notify::cli::{
    handle_notify, handle_serve, handle_targets, NotifyArgs, ServeArgs, TargetsArgs,
};
use pr_card_notify::config::Environment;
use pr_card_notify::notification::SendResult;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "prn")]
#[command(about = "pr-card-notify - 将 PR 事件以卡片形式推送到飞书机器人")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 读取 CI 事件并发送卡片通知
    Notify(NotifyArgs),
    /// 根据变更文件列出会被通知的目标
    Targets(TargetsArgs),
    /// 启动静态文件服务器
    Serve(ServeArgs),
}

fn main() -> Result<()> {
    // 通过 RUST_LOG 环境变量控制日志级别，默认为 info
    // 例如: RUST_LOG=debug prn notify --dry-run
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("pr_card_notify=info,prn=info,tower_http=warn"));

    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Notify(args) => {
            let env = Environment::capture();
            let report = handle_notify(&args, &env)?;

            if report.targets.is_empty() {
                println!("没有匹配的通知目标");
            }
            for (target, result) in &report.results {
                match result {
                    SendResult::Sent => println!("✓ {}", target),
                    SendResult::Skipped(reason) => println!("- {} (跳过: {})", target, reason),
                    SendResult::Failed(reason) => println!("✗ {} (失败: {})", target, reason),
                }
            }
        }
        Commands::Targets(args) => {
            let env = Environment::capture();
            let ids = handle_targets(&args, &env)?;

            if args.json {
                println!("{}", serde_json::to_string_pretty(&ids)?);
            } else if ids.is_empty() {
                println!("没有匹配的通知目标");
            } else {
                for id in ids {
                    println!("{}", id);
                }
            }
        }
        Commands::Serve(args) => {
            handle_serve(args)?;
        }
    }

    Ok(())
}
