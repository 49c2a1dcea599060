//! 基础设施构建器

use crate::infrastructure::SiteConfigInfrastructure;
use config_abstractions::{ListenerKey, PropertyChangedListener, UserConfigurationService};
use config_impl::{
    InMemoryUserConfigurationService, LoggingPropertyListener, SiteConfigurationManager,
    SiteConfigurationOptions,
};
use infrastructure_common::InfrastructureError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// 基础设施构建器
///
/// 使用建造者模式装配站点配置服务、用户配置服务和默认监听器
pub struct InfrastructureBuilder {
    /// 站点配置服务选项
    options: SiteConfigurationOptions,
    /// 额外注册的监听器
    listeners: Vec<(ListenerKey, Arc<dyn PropertyChangedListener>)>,
    /// 用户配置服务，缺省时使用内存实现
    user_configuration: Option<Arc<dyn UserConfigurationService>>,
    /// 是否注册变更日志监听器
    change_logging_enabled: bool,
    /// 是否启用日志初始化
    logging_enabled: bool,
    /// 日志配置
    logging_config: LoggingConfig,
}

impl std::fmt::Debug for InfrastructureBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InfrastructureBuilder")
            .field("options", &self.options)
            .field("listeners_count", &self.listeners.len())
            .field("has_user_configuration", &self.user_configuration.is_some())
            .field("change_logging_enabled", &self.change_logging_enabled)
            .field("logging_enabled", &self.logging_enabled)
            .finish()
    }
}

impl InfrastructureBuilder {
    /// 创建新的基础设施构建器
    pub fn new() -> Self {
        Self {
            options: SiteConfigurationOptions::default(),
            listeners: Vec::new(),
            user_configuration: None,
            change_logging_enabled: true,
            logging_enabled: false, // 默认不启用日志初始化
            logging_config: LoggingConfig::default(),
        }
    }

    /// 使用已有的服务选项
    pub fn with_options(mut self, options: SiteConfigurationOptions) -> Self {
        self.options = options;
        self
    }

    /// 从选项文件和环境变量加载服务选项
    pub fn load_options(mut self, path: Option<&Path>) -> Result<Self, InfrastructureError> {
        self.options = SiteConfigurationOptions::load(path)?;
        info!("已加载站点配置服务选项: {:?}", self.options);
        Ok(self)
    }

    /// 设置配置根路径
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.options.root = Some(root.into());
        self
    }

    /// 设置配置位置列表
    pub fn with_locations<I, S>(mut self, locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = self.options.with_locations(locations);
        self
    }

    /// 设置自定义覆盖文件名模式
    pub fn with_custom_properties_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.options = self.options.with_custom_properties_pattern(pattern);
        self
    }

    /// 注册属性变更监听器
    pub fn with_listener(
        mut self,
        key: ListenerKey,
        listener: Arc<dyn PropertyChangedListener>,
    ) -> Self {
        debug!("添加属性变更监听器: {} -> {}", listener.name(), key);
        self.listeners.push((key, listener));
        self
    }

    /// 使用自定义的用户配置服务
    pub fn with_user_configuration(mut self, service: Arc<dyn UserConfigurationService>) -> Self {
        info!("使用用户配置服务: {}", service.name());
        self.user_configuration = Some(service);
        self
    }

    /// 启用或禁用变更日志监听器
    pub fn enable_change_logging(mut self, enabled: bool) -> Self {
        self.change_logging_enabled = enabled;
        self
    }

    /// 配置日志
    pub fn with_logging(mut self, config: LoggingConfig) -> Self {
        self.logging_config = config;
        self.logging_enabled = true;
        self
    }

    /// 构建基础设施实例
    ///
    /// 只装配服务，不扫描配置文件；调用 [`SiteConfigInfrastructure::start`] 时才初始化。
    pub fn build(self) -> Result<SiteConfigInfrastructure, InfrastructureError> {
        info!("开始构建站点配置基础设施");

        // 只有在明确配置了日志时才初始化日志
        if self.logging_enabled {
            initialize_logging(&self.logging_config)?;
        }

        let manager = SiteConfigurationManager::from_options(&self.options)?;

        if self.change_logging_enabled {
            manager
                .notifier()
                .register(ListenerKey::Any, Arc::new(LoggingPropertyListener::new()));
        }
        for (key, listener) in self.listeners {
            manager.notifier().register(key, listener);
        }

        let user_configuration = self
            .user_configuration
            .unwrap_or_else(|| Arc::new(InMemoryUserConfigurationService::new()));

        info!("站点配置基础设施构建完成");
        Ok(SiteConfigInfrastructure::new(
            Arc::new(manager),
            user_configuration,
        ))
    }
}

impl Default for InfrastructureBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// 初始化日志系统
pub fn initialize_logging(config: &LoggingConfig) -> Result<(), InfrastructureError> {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(config.level)
        .with_target(config.show_target)
        .with_thread_ids(config.show_thread_ids)
        .with_file(config.show_file)
        .with_line_number(config.show_line_number);

    if config.json_format {
        subscriber.json().try_init()
    } else {
        subscriber.try_init()
    }
    .map_err(|e| InfrastructureError::BootstrapFailed {
        message: format!("日志初始化失败: {}", e),
    })?;

    info!("日志系统初始化完成");
    Ok(())
}

/// 日志配置
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: tracing::Level,
    /// 是否显示目标
    pub show_target: bool,
    /// 是否显示线程ID
    pub show_thread_ids: bool,
    /// 是否显示文件名
    pub show_file: bool,
    /// 是否显示行号
    pub show_line_number: bool,
    /// 是否使用 JSON 格式
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: tracing::Level::INFO,
            show_target: true,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// 创建开发环境日志配置
    pub fn development() -> Self {
        Self {
            level: tracing::Level::DEBUG,
            show_target: true,
            show_thread_ids: true,
            show_file: true,
            show_line_number: true,
            json_format: false,
        }
    }

    /// 创建生产环境日志配置
    pub fn production() -> Self {
        Self {
            level: tracing::Level::INFO,
            show_target: false,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: true,
        }
    }

    /// 设置日志级别
    pub fn with_level(mut self, level: tracing::Level) -> Self {
        self.level = level;
        self
    }
}
