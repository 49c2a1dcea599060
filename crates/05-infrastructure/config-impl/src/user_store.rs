//! 内存用户配置存储

use async_trait::async_trait;
use config_abstractions::UserConfigurationService;
use dashmap::DashMap;
use infrastructure_common::{ConfigServiceError, ConfigServiceResult};
use tracing::debug;

/// 用户配置存储键
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct UserConfigKey {
    username: String,
    config_id: String,
    path: Vec<String>,
}

impl UserConfigKey {
    fn new(username: &str, config_id: &str, keys: &[&str]) -> ConfigServiceResult<Self> {
        if username.is_empty() {
            return Err(ConfigServiceError::invalid_path("用户名不能为空"));
        }
        if config_id.is_empty() {
            return Err(ConfigServiceError::invalid_path("配置标识不能为空"));
        }

        Ok(Self {
            username: username.to_string(),
            config_id: config_id.to_string(),
            path: keys.iter().map(|k| k.to_string()).collect(),
        })
    }
}

/// 内存用户配置服务
///
/// 以 (用户名, 配置标识, 键路径) 作为不透明的存储键，不同键路径之间互不影响。
#[derive(Debug, Default)]
pub struct InMemoryUserConfigurationService {
    entries: DashMap<UserConfigKey, String>,
}

impl InMemoryUserConfigurationService {
    /// 创建新的内存用户配置服务
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取存储的条目数量
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl UserConfigurationService for InMemoryUserConfigurationService {
    async fn get_user_configuration(
        &self,
        username: &str,
        config_id: &str,
        keys: &[&str],
    ) -> ConfigServiceResult<Option<String>> {
        let key = UserConfigKey::new(username, config_id, keys)?;
        debug!("获取用户配置: {}/{} {:?}", username, config_id, keys);
        Ok(self.entries.get(&key).map(|entry| entry.value().clone()))
    }

    async fn set_user_configuration(
        &self,
        username: &str,
        config_id: &str,
        configuration: &str,
        keys: &[&str],
    ) -> ConfigServiceResult<()> {
        let key = UserConfigKey::new(username, config_id, keys).map_err(|e| {
            ConfigServiceError::WriteFailed {
                username: username.to_string(),
                config_id: config_id.to_string(),
                message: e.to_string(),
            }
        })?;
        debug!("设置用户配置: {}/{} {:?}", username, config_id, keys);
        self.entries.insert(key, configuration.to_string());
        Ok(())
    }

    fn name(&self) -> &str {
        "InMemoryUserConfigurationService"
    }
}
