pub mod cli;
pub mod errors;
pub mod loader;

use errors::FrontendError;
use lyra_config::EditorConfig;
use tracing::info;

pub use cli::CliOptions;

/// 运行无界面的 CLI 前端或返回错误。
pub fn run_cli(options: &CliOptions, editor: &EditorConfig) -> Result<(), FrontendError> {
    info!(unit = %options.unit, commands = options.commands.len(), "启动 CLI 前端");
    cli::run(options, editor)
}
