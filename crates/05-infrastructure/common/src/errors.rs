//! 错误类型定义

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// 单个配置源的失败描述
///
/// 初始化时每个无法读取或解析的文件都会生成一条记录，最终汇总到
/// [`SiteConfigError::Initialization`] 中。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFailure {
    /// 出错的文件路径
    pub path: PathBuf,
    /// 失败原因
    pub reason: String,
}

impl SourceFailure {
    /// 创建新的失败记录
    pub fn new(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for SourceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.reason)
    }
}

/// 站点配置错误类型
#[derive(Error, Debug)]
pub enum SiteConfigError {
    #[error("站点配置初始化失败: {message}")]
    Initialization {
        message: String,
        failures: Vec<SourceFailure>,
    },

    #[error("站点配置解析失败: {message}")]
    Resolution { message: String },

    #[error("站点配置写入失败: {property}, 监听器错误: {failures:?}")]
    Write {
        property: String,
        failures: Vec<String>,
    },

    #[error("配置类型转换失败: {property}={value}, 目标类型: {target}")]
    TypeCoercion {
        property: String,
        value: String,
        target: &'static str,
    },

    #[error("自定义配置文件名模式无效: {pattern}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl SiteConfigError {
    /// 创建初始化错误
    pub fn initialization(message: impl Into<String>) -> Self {
        Self::Initialization {
            message: message.into(),
            failures: Vec::new(),
        }
    }

    /// 创建携带文件失败列表的初始化错误
    pub fn aggregated(failures: Vec<SourceFailure>) -> Self {
        let message = failures
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Self::Initialization {
            message: format!("{} 个配置文件无法加载: {}", failures.len(), message),
            failures,
        }
    }

    /// 创建解析错误
    pub fn resolution(message: impl Into<String>) -> Self {
        Self::Resolution {
            message: message.into(),
        }
    }

    /// 创建类型转换错误
    pub fn type_coercion(
        property: impl Into<String>,
        value: impl Into<String>,
        target: &'static str,
    ) -> Self {
        Self::TypeCoercion {
            property: property.into(),
            value: value.into(),
            target,
        }
    }

    /// 初始化错误中汇总的文件失败列表
    pub fn source_failures(&self) -> &[SourceFailure] {
        match self {
            Self::Initialization { failures, .. } => failures,
            _ => &[],
        }
    }
}

/// 用户配置服务错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigServiceError {
    #[error("用户配置写入失败: {username}/{config_id}, 原因: {message}")]
    WriteFailed {
        username: String,
        config_id: String,
        message: String,
    },

    #[error("用户配置不存在: {username}/{config_id}")]
    NotFound { username: String, config_id: String },

    #[error("用户配置路径无效: {message}")]
    InvalidPath { message: String },
}

impl ConfigServiceError {
    /// 创建路径无效错误
    pub fn invalid_path(message: impl Into<String>) -> Self {
        Self::InvalidPath {
            message: message.into(),
        }
    }
}

/// 基础设施错误类型
#[derive(Error, Debug)]
pub enum InfrastructureError {
    #[error("站点配置错误: {source}")]
    SiteConfig {
        #[from]
        source: SiteConfigError,
    },

    #[error("用户配置错误: {source}")]
    UserConfig {
        #[from]
        source: ConfigServiceError,
    },

    #[error("基础设施启动失败: {message}")]
    BootstrapFailed { message: String },
}

/// 结果类型别名
pub type SiteConfigResult<T> = Result<T, SiteConfigError>;
pub type ConfigServiceResult<T> = Result<T, ConfigServiceError>;
pub type InfrastructureResult<T> = Result<T, InfrastructureError>;
