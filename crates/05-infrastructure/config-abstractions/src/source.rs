//! 配置源描述

use std::path::{Path, PathBuf};

/// 标准配置文件后缀
pub const STANDARD_PROPERTIES_SUFFIX: &str = ".properties";

/// 默认的自定义覆盖文件名模式
pub const DEFAULT_CUSTOM_PROPERTIES_PATTERN: &str = r"^.*-config\.properties";

/// 配置文件分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// 标准配置文件
    Standard,
    /// 匹配自定义模式的覆盖文件，在同一目录内最后合并
    CustomOverride,
}

/// 扫描得到的候选配置文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertySource {
    /// 文件路径
    pub path: PathBuf,
    /// 文件分类
    pub kind: SourceKind,
}

impl PropertySource {
    /// 创建标准配置源
    pub fn standard(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: SourceKind::Standard,
        }
    }

    /// 创建自定义覆盖配置源
    pub fn custom_override(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: SourceKind::CustomOverride,
        }
    }

    /// 获取文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// 配置源设置：根路径、位置列表与覆盖文件模式
///
/// 位置列表的顺序即合并优先级，后面的位置覆盖前面的位置。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSettings {
    /// 相对位置的解析根路径
    pub root: Option<PathBuf>,
    /// 位置列表（绝对路径或相对根路径）
    pub locations: Vec<String>,
    /// 自定义覆盖文件名模式
    pub custom_properties_pattern: String,
}

impl SourceSettings {
    /// 创建新的配置源设置
    pub fn new(root: Option<PathBuf>, locations: Vec<String>) -> Self {
        Self {
            root,
            locations,
            custom_properties_pattern: DEFAULT_CUSTOM_PROPERTIES_PATTERN.to_string(),
        }
    }

    /// 设置覆盖文件模式
    pub fn with_custom_properties_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.custom_properties_pattern = pattern.into();
        self
    }
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self::new(None, Vec::new())
    }
}
