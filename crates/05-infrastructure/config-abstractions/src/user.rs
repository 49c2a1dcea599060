//! 用户配置服务抽象接口

use async_trait::async_trait;
use infrastructure_common::ConfigServiceResult;

/// 用户配置服务 trait
///
/// 以 (用户名, 配置标识, 键路径) 寻址；键路径如何组合由存储实现决定。
#[async_trait]
pub trait UserConfigurationService: Send + Sync {
    /// 获取用户配置内容
    async fn get_user_configuration(
        &self,
        username: &str,
        config_id: &str,
        keys: &[&str],
    ) -> ConfigServiceResult<Option<String>>;

    /// 设置用户配置内容
    async fn set_user_configuration(
        &self,
        username: &str,
        config_id: &str,
        configuration: &str,
        keys: &[&str],
    ) -> ConfigServiceResult<()>;

    /// 获取服务名称
    fn name(&self) -> &str;
}
