use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use lyra_config::{AppConfig, ConfigError};
use lyra_core::units::DisplayUnit;
use lyra_frontend::CliOptions;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

/// LyraTool 曝光图形编辑器的命令行入口。
#[derive(Debug, Parser)]
#[command(name = "lyra-app")]
#[command(about = "Beam lithography exposure pattern editor (headless)")]
#[command(version)]
struct Cli {
    /// Configuration file, overrides LYRA_CONFIG and ./config/default.toml
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Display unit for lengths: m, mm, um, nm or a
    #[arg(long, value_parser = parse_unit)]
    unit: Option<DisplayUnit>,

    /// Populate a new project with the sample shapes
    #[arg(long)]
    demo: bool,

    /// Editor command to run, may be repeated (e.g. "add_shape circle")
    #[arg(long = "command", value_name = "CMD")]
    commands: Vec<String>,

    /// Write the resulting project to this path
    #[arg(long, value_name = "PATH")]
    save: Option<PathBuf>,

    /// Project file to open
    project: Option<PathBuf>,
}

fn parse_unit(raw: &str) -> Result<DisplayUnit, String> {
    DisplayUnit::parse(raw).ok_or_else(|| format!("unknown display unit `{raw}`"))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_configuration(cli.config.as_ref())?;
    init_logging(&config);
    info!("启动 LyraTool");

    let options = CliOptions {
        project: cli.project,
        demo: cli.demo,
        commands: cli.commands,
        save: cli.save,
        unit: cli.unit.unwrap_or(config.editor.display_unit),
    };
    lyra_frontend::run_cli(&options, &config.editor).context("执行 CLI 前端失败")?;
    Ok(())
}

/// 显式指定的配置读取失败视为错误；自动发现失败时回退到内建默认值。
fn load_configuration(override_path: Option<&PathBuf>) -> anyhow::Result<AppConfig> {
    if let Some(path) = override_path {
        return AppConfig::from_file(path)
            .with_context(|| format!("加载配置文件 {} 失败", path.display()));
    }

    Ok(match AppConfig::discover() {
        Ok(cfg) => cfg,
        Err(err) => {
            match &err {
                ConfigError::Io { path, .. } | ConfigError::Parse { path, .. } => {
                    eprintln!("加载默认配置 {} 失败，使用内建默认值: {err}", path.display());
                }
                ConfigError::Context { .. } => {
                    eprintln!("加载默认配置失败，使用内建默认值: {err}");
                }
            }
            AppConfig::default()
        }
    })
}

fn init_logging(config: &AppConfig) {
    let filter = match EnvFilter::try_new(&config.logging.level) {
        Ok(filter) => filter,
        Err(_) => {
            eprintln!("无效的日志等级 `{}`，使用 info", config.logging.level);
            EnvFilter::new("info")
        }
    };
    let subscriber = fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if subscriber.try_init().is_err() {
        warn!("日志系统已初始化，忽略");
    }
}
