use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use lyra_core::units::DisplayUnit;
use serde::Deserialize;
use thiserror::Error;

/// 应用配置的根结构。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub editor: EditorConfig,
}

impl AppConfig {
    /// 从显式路径加载配置。
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// 自动发现配置文件：优先读取环境变量 `LYRA_CONFIG`，否则寻找 `./config/default.toml`。
    /// 若文件缺失，则返回默认配置。
    pub fn discover() -> Result<Self, ConfigError> {
        if let Some(path) = env::var_os("LYRA_CONFIG") {
            return Self::from_file(PathBuf::from(path));
        }

        let default_path = env::current_dir()
            .map(|dir| dir.join("config").join("default.toml"))
            .map_err(|source| ConfigError::Context {
                message: "获取当前工作目录失败".to_string(),
                source,
            })?;

        if default_path.exists() {
            Self::from_file(default_path)
        } else {
            Ok(Self::default())
        }
    }
}

/// 日志配置，支持设置默认等级。
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

/// 编辑器视图与显示相关的偏好。文档中的数值始终以米为单位，
/// `display_unit` 只影响输出时的换算。
#[derive(Debug, Clone, Deserialize)]
pub struct EditorConfig {
    #[serde(default)]
    pub display_unit: DisplayUnit,
    #[serde(default = "EditorConfig::default_zoom")]
    pub initial_zoom: f64,
    #[serde(default = "EditorConfig::default_display_scale")]
    pub display_scale: f64,
    #[serde(default = "EditorConfig::default_width")]
    pub viewport_width: f64,
    #[serde(default = "EditorConfig::default_height")]
    pub viewport_height: f64,
    #[serde(default = "EditorConfig::default_true")]
    pub show_grid: bool,
    #[serde(default = "EditorConfig::default_true")]
    pub show_axes: bool,
}

impl EditorConfig {
    fn default_zoom() -> f64 {
        7.0
    }

    fn default_display_scale() -> f64 {
        1.0
    }

    fn default_width() -> f64 {
        800.0
    }

    fn default_height() -> f64 {
        600.0
    }

    fn default_true() -> bool {
        true
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            display_unit: DisplayUnit::default(),
            initial_zoom: Self::default_zoom(),
            display_scale: Self::default_display_scale(),
            viewport_width: Self::default_width(),
            viewport_height: Self::default_height(),
            show_grid: true,
            show_axes: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置文件 {path:?} 失败: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("解析配置文件 {path:?} 失败: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{message}")]
    Context {
        message: String,
        #[source]
        source: std::io::Error,
    },
}
