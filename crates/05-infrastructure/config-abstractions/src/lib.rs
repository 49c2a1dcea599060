//! # Configuration Abstractions
//!
//! 站点配置服务的抽象层，定义核心接口和值类型。
//!
//! ## 核心接口
//!
//! - [`SiteConfigurationService`] - 站点配置服务接口
//! - [`UserConfigurationService`] - 用户配置存储接口
//! - [`PropertyChangedListener`] - 属性变更监听器接口

pub mod events;
pub mod manager;
pub mod properties;
pub mod source;
pub mod user;

pub use events::*;
pub use manager::*;
pub use properties::*;
pub use source::*;
pub use user::*;
