use lyra_engine::errors::EngineError;
use lyra_io::IoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrontendError {
    #[error(transparent)]
    Io(#[from] IoError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("未知命令: {0}")]
    UnknownCommand(String),
    #[error("命令 `{command}` 执行失败: {message}")]
    CommandFailed { command: String, message: String },
}
