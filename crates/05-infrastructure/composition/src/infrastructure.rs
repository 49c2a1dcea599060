//! 基础设施主入口

use crate::builder::InfrastructureBuilder;
use config_abstractions::{SiteConfigurationService, UserConfigurationService};
use config_impl::SiteConfigurationManager;
use infrastructure_common::InfrastructureError;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

/// 站点配置基础设施
///
/// 持有站点配置服务与用户配置服务，负责启动时初始化和停止时重置
pub struct SiteConfigInfrastructure {
    /// 站点配置管理器
    site_configuration: Arc<SiteConfigurationManager>,
    /// 用户配置服务
    user_configuration: Arc<dyn UserConfigurationService>,
    /// 运行状态
    status: RwLock<InfrastructureStatus>,
    /// 启动与停止时间
    lifecycle_times: RwLock<LifecycleTimes>,
}

#[derive(Debug, Default, Clone, Copy)]
struct LifecycleTimes {
    start_time: Option<chrono::DateTime<chrono::Utc>>,
    stop_time: Option<chrono::DateTime<chrono::Utc>>,
}

impl std::fmt::Debug for SiteConfigInfrastructure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteConfigInfrastructure")
            .field("site_configuration", &self.site_configuration)
            .field("user_configuration", &self.user_configuration.name())
            .field("status", &self.status())
            .finish()
    }
}

impl SiteConfigInfrastructure {
    /// 创建基础设施构建器
    pub fn builder() -> InfrastructureBuilder {
        InfrastructureBuilder::new()
    }

    /// 内部构造函数
    pub(crate) fn new(
        site_configuration: Arc<SiteConfigurationManager>,
        user_configuration: Arc<dyn UserConfigurationService>,
    ) -> Self {
        Self {
            site_configuration,
            user_configuration,
            status: RwLock::new(InfrastructureStatus::Initialized),
            lifecycle_times: RwLock::new(LifecycleTimes::default()),
        }
    }

    /// 启动基础设施：扫描并合并站点配置
    pub fn start(&self) -> Result<(), InfrastructureError> {
        info!("启动站点配置基础设施");
        *self.status.write() = InfrastructureStatus::Starting;

        if let Err(e) = self.site_configuration.initialize() {
            error!("站点配置初始化失败: {}", e);
            *self.status.write() = InfrastructureStatus::Failed;
            return Err(e.into());
        }

        self.lifecycle_times.write().start_time = Some(chrono::Utc::now());
        *self.status.write() = InfrastructureStatus::Running;
        info!("站点配置基础设施启动完成");
        Ok(())
    }

    /// 停止基础设施：丢弃缓存的站点配置
    pub fn stop(&self) {
        info!("停止站点配置基础设施");
        *self.status.write() = InfrastructureStatus::Stopping;

        self.site_configuration.reset();

        self.lifecycle_times.write().stop_time = Some(chrono::Utc::now());
        *self.status.write() = InfrastructureStatus::Stopped;
        info!("站点配置基础设施已停止");
    }

    /// 获取站点配置管理器
    pub fn site_configuration(&self) -> Arc<SiteConfigurationManager> {
        self.site_configuration.clone()
    }

    /// 以 trait 对象形式获取站点配置服务
    pub fn site_configuration_service(&self) -> Arc<dyn SiteConfigurationService> {
        self.site_configuration.clone()
    }

    /// 获取用户配置服务
    pub fn user_configuration(&self) -> Arc<dyn UserConfigurationService> {
        self.user_configuration.clone()
    }

    /// 获取运行状态
    pub fn status(&self) -> InfrastructureStatus {
        *self.status.read()
    }

    /// 获取统计信息
    pub fn metrics(&self) -> InfrastructureMetrics {
        let times = *self.lifecycle_times.read();
        let notifier = self.site_configuration.notifier();
        let property_count = self
            .site_configuration
            .properties()
            .map(|properties| properties.len())
            .unwrap_or(0);

        InfrastructureMetrics {
            start_time: times.start_time,
            stop_time: times.stop_time,
            initialized: self.site_configuration.is_initialized(),
            property_count,
            listener_count: notifier.listener_count(),
            events_dispatched: notifier.stats().events(),
            listener_invocations: notifier.stats().invocations(),
            listener_failures: notifier.stats().failures(),
        }
    }
}

/// 基础设施状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InfrastructureStatus {
    /// 已初始化
    Initialized,
    /// 启动中
    Starting,
    /// 运行中
    Running,
    /// 停止中
    Stopping,
    /// 已停止
    Stopped,
    /// 失败
    Failed,
}

/// 基础设施统计信息
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InfrastructureMetrics {
    /// 启动时间
    pub start_time: Option<chrono::DateTime<chrono::Utc>>,
    /// 停止时间
    pub stop_time: Option<chrono::DateTime<chrono::Utc>>,
    /// 站点配置是否已初始化
    pub initialized: bool,
    /// 当前属性数量
    pub property_count: usize,
    /// 已注册的监听器数量
    pub listener_count: usize,
    /// 已分发的变更事件数
    pub events_dispatched: u64,
    /// 监听器调用次数
    pub listener_invocations: u64,
    /// 监听器失败次数
    pub listener_failures: u64,
}
