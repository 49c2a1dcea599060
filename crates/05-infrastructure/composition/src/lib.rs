//! # 基础设施组合层
//!
//! 将站点配置服务、属性变更通知和用户配置存储组合成一个可运行的整体。
//!
//! ## 主要功能
//!
//! - **基础设施构建器**: 使用构建者模式装配服务选项、监听器和用户配置服务
//! - **日志初始化**: 开发和生产两套预设
//! - **生命周期管理**: 启动时初始化站点配置，停止时重置
//!
//! ## 基本使用
//!
//! ```rust,no_run
//! use config_abstractions::SiteConfigurationService;
//! use infrastructure_composition::InfrastructureBuilder;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let infrastructure = InfrastructureBuilder::new()
//!         .with_root("/etc/site")
//!         .with_locations(["base", "site"])
//!         .build()?;
//!
//!     infrastructure.start()?;
//!
//!     let timeout = infrastructure
//!         .site_configuration()
//!         .get_integer_property("timeout")?;
//!     println!("timeout = {:?}", timeout);
//!
//!     infrastructure.stop();
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod infrastructure;

// 重新导出主要类型
pub use builder::{initialize_logging, InfrastructureBuilder, LoggingConfig};
pub use infrastructure::{InfrastructureMetrics, InfrastructureStatus, SiteConfigInfrastructure};

// 重新导出错误类型
pub use infrastructure_common::InfrastructureError;
