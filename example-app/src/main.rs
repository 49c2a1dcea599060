//! # 示例应用程序
//!
//! 站点配置服务的命令行入口：解析分层配置、读取和修改属性、演示用户配置存储

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use config_abstractions::{SiteConfigurationService, UserConfigurationService};
use infrastructure_common::{SiteConfigError, SiteConfigResult};
use infrastructure_composition::{InfrastructureBuilder, LoggingConfig, SiteConfigInfrastructure};
use std::path::PathBuf;
use tracing::{info, warn};

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "example-app")]
#[command(about = "分层站点配置服务示例")]
struct Args {
    /// 服务选项文件路径（TOML，可缺省）
    #[arg(short, long)]
    options: Option<PathBuf>,

    /// 配置根路径，覆盖选项文件和环境变量
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// 配置位置，可重复指定，后面的覆盖前面的
    #[arg(short = 'l', long = "location")]
    locations: Vec<String>,

    /// 自定义覆盖文件名模式
    #[arg(long)]
    pattern: Option<String>,

    /// 日志级别
    #[arg(long, default_value = "info")]
    log_level: String,

    /// 使用 JSON 格式输出日志
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 读取单个属性
    Get {
        /// 属性名
        property: String,
    },
    /// 设置属性（仅作用于本次进程的缓存）
    Set {
        /// 属性名
        property: String,
        /// 属性值
        value: String,
        /// 操作用户
        #[arg(short, long, default_value = "admin")]
        user: String,
    },
    /// 按属性名排序列出合并后的全部属性
    List,
    /// 以 JSON 输出快照信息和统计
    Show,
    /// 写入并读回一条用户配置
    User {
        /// 用户名
        username: String,
        /// 配置标识
        config_id: String,
        /// 配置内容
        content: String,
        /// 键路径
        #[arg(short, long)]
        key: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let logging = LoggingConfig {
        json_format: args.json_logs,
        ..LoggingConfig::default()
    }
    .with_level(parse_log_level(&args.log_level));

    let infrastructure = build_infrastructure(&args, logging)?;
    infrastructure
        .start()
        .context("站点配置初始化失败")?;

    let result = run_command(&infrastructure, args.command).await;

    infrastructure.stop();
    result
}

/// 构建基础设施
fn build_infrastructure(
    args: &Args,
    logging: LoggingConfig,
) -> anyhow::Result<SiteConfigInfrastructure> {
    let mut builder = InfrastructureBuilder::new()
        .with_logging(logging)
        .load_options(args.options.as_deref())?;

    if let Some(root) = &args.root {
        builder = builder.with_root(root.clone());
    }
    if !args.locations.is_empty() {
        builder = builder.with_locations(args.locations.iter().cloned());
    }
    if let Some(pattern) = &args.pattern {
        builder = builder.with_custom_properties_pattern(pattern.clone());
    }

    let infrastructure = builder.build()?;
    info!("基础设施构建完成");
    Ok(infrastructure)
}

async fn run_command(
    infrastructure: &SiteConfigInfrastructure,
    command: Command,
) -> anyhow::Result<()> {
    let site = infrastructure.site_configuration();

    match command {
        Command::Get { property } => match site.get_property(&property)? {
            Some(value) => println!("{}", value),
            None => bail!("属性不存在: {}", property),
        },
        Command::Set {
            property,
            value,
            user,
        } => {
            accept_applied_write(site.set_property(&user, &property, &value))?;
            println!("{}={}", property, value);
        }
        Command::List => {
            let properties = site.properties()?;
            for key in properties.keys() {
                if let Some(value) = properties.get(key) {
                    println!("{}={}", key, value);
                }
            }
        }
        Command::Show => {
            let snapshot = site.snapshot();
            let report = serde_json::json!({
                "root": snapshot.as_ref().and_then(|s| s.root.clone()),
                "locations": snapshot.as_ref().map(|s| s.locations.clone()),
                "custom_properties_pattern": snapshot
                    .as_ref()
                    .map(|s| s.custom_properties_pattern.clone()),
                "built_at": snapshot.as_ref().map(|s| s.built_at),
                "metrics": infrastructure.metrics(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::User {
            username,
            config_id,
            content,
            key,
        } => {
            let store = infrastructure.user_configuration();
            let keys: Vec<&str> = key.iter().map(String::as_str).collect();
            store
                .set_user_configuration(&username, &config_id, &content, &keys)
                .await?;
            let stored = store
                .get_user_configuration(&username, &config_id, &keys)
                .await?;
            info!("用户配置已写入: {}/{}", username, config_id);
            println!("{}", stored.unwrap_or_default());
        }
    }

    Ok(())
}

/// 写入错误只说明监听器失败，值已经生效；其余错误照常返回
fn accept_applied_write(result: SiteConfigResult<()>) -> anyhow::Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(e @ SiteConfigError::Write { .. }) => {
            warn!("属性已设置但通知失败: {}", e);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// 解析日志级别
fn parse_log_level(level: &str) -> tracing::Level {
    match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 测试监听器失败时写入仍视为成功
    #[test]
    fn test_listener_failure_is_accepted() {
        let result = accept_applied_write(Err(SiteConfigError::Write {
            property: "timeout".to_string(),
            failures: vec!["audit: 不可用".to_string()],
        }));
        assert!(result.is_ok());
    }

    /// 测试其他错误照常返回
    #[test]
    fn test_resolution_failure_is_propagated() {
        let result = accept_applied_write(Err(SiteConfigError::resolution("站点配置尚未初始化")));
        assert!(result.is_err());
    }
}
