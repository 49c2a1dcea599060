//! 站点配置服务抽象接口

use crate::events::{ListenerId, ListenerKey, PropertyChangedListener};
use crate::properties::MergedProperties;
use infrastructure_common::{SiteConfigError, SiteConfigResult};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing::warn;

/// 当前生效的站点配置快照
///
/// 根路径、位置列表与属性集合总是一起发布，读者看到的设置一定对应当前属性集合。
#[derive(Debug, Clone)]
pub struct SiteSnapshot {
    /// 构建时使用的根路径
    pub root: Option<PathBuf>,
    /// 构建时使用的位置列表
    pub locations: Vec<String>,
    /// 构建时使用的覆盖文件模式
    pub custom_properties_pattern: String,
    /// 合并后的属性
    pub properties: Arc<MergedProperties>,
    /// 构建时间
    pub built_at: chrono::DateTime<chrono::Utc>,
}

/// 站点配置服务 trait
///
/// 生命周期：未初始化 → 已初始化 → 重置（回到未初始化）→ 可再次初始化。
/// 根路径和位置列表的 setter 只修改待用设置，不会触发重新加载。
pub trait SiteConfigurationService: Send + Sync {
    /// 扫描并合并配置文件；已初始化时不做任何事
    fn initialize(&self) -> SiteConfigResult<()>;

    /// 设置给定的根路径和/或位置列表，丢弃当前属性并重新初始化
    fn update(
        &self,
        root: Option<PathBuf>,
        locations: Option<Vec<String>>,
    ) -> SiteConfigResult<Arc<MergedProperties>>;

    /// 丢弃当前属性，回到未初始化状态
    fn reset(&self);

    /// 是否已初始化
    fn is_initialized(&self) -> bool;

    /// 获取完整的属性集合；未初始化时返回解析错误
    fn properties(&self) -> SiteConfigResult<Arc<MergedProperties>>;

    /// 获取当前生效的快照
    fn snapshot(&self) -> Option<Arc<SiteSnapshot>>;

    /// 获取属性值，必要时按需初始化
    fn get_property(&self, property: &str) -> SiteConfigResult<Option<String>>;

    /// 写入单个属性并通知监听器
    ///
    /// 返回 [`SiteConfigError::Write`] 时新值可能已经生效，错误只表示监听器失败。
    fn set_property(&self, username: &str, property: &str, value: &str) -> SiteConfigResult<()>;

    /// 获取位置列表
    fn config_files_locations(&self) -> Vec<String>;

    /// 设置位置列表，不触发重新加载
    fn set_config_files_locations(&self, locations: Vec<String>);

    /// 获取根路径
    fn config_files_locations_root(&self) -> Option<PathBuf>;

    /// 设置根路径，不触发重新加载
    fn set_config_files_locations_root(&self, root: PathBuf);

    /// 获取自定义覆盖文件名模式
    fn custom_properties_name_pattern(&self) -> String;

    /// 设置自定义覆盖文件名模式，不触发重新加载
    fn set_custom_properties_name_pattern(&self, pattern: &str) -> SiteConfigResult<()>;

    /// 注册属性变更监听器
    fn register_listener(
        &self,
        key: ListenerKey,
        listener: Arc<dyn PropertyChangedListener>,
    ) -> ListenerId;

    /// 注销属性变更监听器
    fn unregister_listener(&self, id: ListenerId) -> bool;

    /// 只更新根路径
    fn update_root(&self, root: PathBuf) -> SiteConfigResult<Arc<MergedProperties>> {
        self.update(Some(root), None)
    }

    /// 只更新位置列表
    fn update_locations(&self, locations: Vec<String>) -> SiteConfigResult<Arc<MergedProperties>> {
        self.update(None, Some(locations))
    }

    /// 获取布尔属性
    ///
    /// 不区分大小写等于 `true` 时为真，其余值均为假；属性不存在时返回默认值。从不报错。
    fn get_bool_property(&self, property: &str, default_value: bool) -> bool {
        match self.get_property(property) {
            Ok(Some(value)) => value.eq_ignore_ascii_case("true"),
            Ok(None) => default_value,
            Err(e) => {
                warn!("读取布尔属性 {} 失败，使用默认值 {}: {}", property, default_value, e);
                default_value
            }
        }
    }

    /// 获取 32 位整数属性
    fn get_integer_property(&self, property: &str) -> SiteConfigResult<Option<i32>> {
        parse_typed(property, self.get_property(property)?, "i32")
    }

    /// 获取 64 位整数属性
    fn get_long_property(&self, property: &str) -> SiteConfigResult<Option<i64>> {
        parse_typed(property, self.get_property(property)?, "i64")
    }

    /// 获取单精度浮点属性
    fn get_float_property(&self, property: &str) -> SiteConfigResult<Option<f32>> {
        parse_typed(property, self.get_property(property)?, "f32")
    }

    /// 获取双精度浮点属性
    fn get_double_property(&self, property: &str) -> SiteConfigResult<Option<f64>> {
        parse_typed(property, self.get_property(property)?, "f64")
    }
}

/// 将文本值解析为目标类型，不存在时返回 `None`
pub fn parse_typed<T: FromStr>(
    property: &str,
    value: Option<String>,
    target: &'static str,
) -> SiteConfigResult<Option<T>> {
    match value {
        None => Ok(None),
        Some(raw) => {
            let parsed = raw.trim().parse::<T>();
            match parsed {
                Ok(typed) => Ok(Some(typed)),
                Err(_) => Err(SiteConfigError::type_coercion(property, raw, target)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 测试属性不存在时返回 None
    #[test]
    fn test_parse_typed_absent_is_none() {
        let parsed: Option<i32> = parse_typed("x", None, "i32").unwrap();
        assert_eq!(parsed, None);
    }

    /// 测试数值解析前去除首尾空白
    #[test]
    fn test_parse_typed_trims_and_parses() {
        let parsed: Option<i64> = parse_typed("x", Some(" 42 ".to_string()), "i64").unwrap();
        assert_eq!(parsed, Some(42));
    }

    /// 测试无法解析的值返回类型转换错误
    #[test]
    fn test_parse_typed_rejects_garbage() {
        let result: SiteConfigResult<Option<f64>> =
            parse_typed("ratio", Some("abc".to_string()), "f64");
        match result {
            Err(SiteConfigError::TypeCoercion { property, value, target }) => {
                assert_eq!(property, "ratio");
                assert_eq!(value, "abc");
                assert_eq!(target, "f64");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
