//! # Configuration Implementation
//!
//! 站点配置服务的具体实现。
//!
//! ## 主要组件
//!
//! - [`PropertySourceScanner`] - 按位置列表枚举候选配置文件
//! - [`PropertyMerger`] - 按优先级读取并合并属性
//! - [`SiteConfigurationManager`] - 站点配置缓存与生命周期管理
//! - [`PropertyChangeNotifier`] - 属性变更通知
//! - [`InMemoryUserConfigurationService`] - 内存用户配置存储
//! - [`SiteConfigurationOptions`] - 服务启动选项

pub mod event_handler;
pub mod manager;
pub mod merger;
pub mod options;
pub mod parser;
pub mod scanner;
pub mod user_store;

pub use event_handler::*;
pub use manager::*;
pub use merger::*;
pub use options::*;
pub use parser::*;
pub use scanner::*;
pub use user_store::*;
