//! # Infrastructure Common
//!
//! 站点配置基础设施的公共错误类型。
//!
//! - [`SiteConfigError`] - 站点配置的初始化、解析、写入与类型转换错误
//! - [`ConfigServiceError`] - 用户配置存储错误
//! - [`InfrastructureError`] - 启动装配阶段的顶层错误

pub mod errors;

pub use errors::*;
