//! 合并后的属性集合

use serde::Serialize;
use std::collections::HashMap;

/// 合并后的站点属性
///
/// 每次初始化都会构建新的实例，构建完成后只读。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergedProperties {
    values: HashMap<String, String>,
}

impl MergedProperties {
    /// 创建空的属性集合
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取属性值
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// 检查属性是否存在
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// 属性数量
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 遍历所有属性
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// 按名称排序的属性名列表
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.values.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// 转换为普通映射
    pub fn to_map(&self) -> HashMap<String, String> {
        self.values.clone()
    }

    /// 写入或覆盖属性，返回旧值
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.values.insert(key.into(), value.into())
    }

    /// 将另一组属性合并进来，已有的同名键被覆盖
    pub fn extend<I, K, V>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.values
            .extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
    }
}

impl From<HashMap<String, String>> for MergedProperties {
    fn from(values: HashMap<String, String>) -> Self {
        Self { values }
    }
}

impl<K, V> FromIterator<(K, V)> for MergedProperties
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut properties = Self::new();
        properties.extend(iter);
        properties
    }
}
