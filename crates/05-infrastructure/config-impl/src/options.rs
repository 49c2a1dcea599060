//! 站点配置服务自身的启动选项

use config_abstractions::{SourceSettings, DEFAULT_CUSTOM_PROPERTIES_PATTERN};
use infrastructure_common::{SiteConfigError, SiteConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// 环境变量前缀
pub const OPTIONS_ENV_PREFIX: &str = "SITE_CONFIG";

/// 站点配置服务选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfigurationOptions {
    /// 相对位置的解析根路径
    #[serde(default)]
    pub root: Option<PathBuf>,
    /// 配置文件位置列表，后面的覆盖前面的
    #[serde(default)]
    pub locations: Vec<String>,
    /// 自定义覆盖文件名模式
    #[serde(default = "default_custom_properties_pattern")]
    pub custom_properties_pattern: String,
}

fn default_custom_properties_pattern() -> String {
    DEFAULT_CUSTOM_PROPERTIES_PATTERN.to_string()
}

impl Default for SiteConfigurationOptions {
    fn default() -> Self {
        Self {
            root: None,
            locations: Vec::new(),
            custom_properties_pattern: default_custom_properties_pattern(),
        }
    }
}

impl SiteConfigurationOptions {
    /// 从选项文件（可缺省）和 `SITE_CONFIG_*` 环境变量加载
    ///
    /// 环境变量优先；`SITE_CONFIG_LOCATIONS` 以逗号分隔。
    pub fn load(path: Option<&Path>) -> SiteConfigResult<Self> {
        Self::load_with_environment(path, None)
    }

    /// `environment` 为空时读取进程环境变量
    fn load_with_environment(
        path: Option<&Path>,
        environment: Option<config::Map<String, String>>,
    ) -> SiteConfigResult<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            debug!("加载站点配置服务选项: {}", path.display());
            builder = builder.add_source(config::File::from(path).required(false));
        }

        // 列表拆分依赖 try_parsing；数值形式的字符串由反序列化按字符串读回
        let settings = builder
            .add_source(
                config::Environment::with_prefix(OPTIONS_ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("locations")
                    .source(environment),
            )
            .build()
            .map_err(|e| SiteConfigError::initialization(format!("读取服务选项失败: {}", e)))?;

        settings
            .try_deserialize()
            .map_err(|e| SiteConfigError::initialization(format!("服务选项格式错误: {}", e)))
    }

    /// 设置根路径
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// 设置位置列表
    pub fn with_locations<I, S>(mut self, locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.locations = locations.into_iter().map(Into::into).collect();
        self
    }

    /// 设置自定义覆盖文件名模式
    pub fn with_custom_properties_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.custom_properties_pattern = pattern.into();
        self
    }

    /// 转换为配置源设置
    pub fn to_source_settings(&self) -> SourceSettings {
        SourceSettings::new(self.root.clone(), self.locations.clone())
            .with_custom_properties_pattern(self.custom_properties_pattern.clone())
    }
}
