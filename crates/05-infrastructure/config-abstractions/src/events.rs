//! 属性变更事件与监听器定义

use serde::{Deserialize, Serialize};
use std::fmt;

/// 监听器返回的错误类型
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

/// 监听器处理结果
pub type ListenerResult = Result<(), ListenerError>;

/// 属性变更事件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyChangeEvent {
    /// 属性名
    pub property: String,
    /// 旧值，属性此前不存在时为 `None`
    pub old_value: Option<String>,
    /// 新值
    pub new_value: String,
    /// 执行写入的用户，仅用于审计
    pub username: String,
    /// 事件时间
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl PropertyChangeEvent {
    /// 创建属性变更事件
    pub fn new(
        property: impl Into<String>,
        old_value: Option<String>,
        new_value: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            property: property.into(),
            old_value,
            new_value: new_value.into(),
            username: username.into(),
            timestamp: chrono::Utc::now(),
        }
    }

    /// 是否为新增属性
    pub fn is_created(&self) -> bool {
        self.old_value.is_none()
    }
}

/// 监听器注册键
///
/// `Property` 只接收指定属性的变更，`Any` 接收所有属性的变更。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ListenerKey {
    /// 指定属性名
    Property(String),
    /// 通配（默认）监听
    Any,
}

impl ListenerKey {
    /// 为指定属性创建注册键
    pub fn property(name: impl Into<String>) -> Self {
        Self::Property(name.into())
    }

    /// 判断该键是否匹配给定属性
    pub fn matches(&self, property: &str) -> bool {
        match self {
            Self::Property(name) => name == property,
            Self::Any => true,
        }
    }
}

impl fmt::Display for ListenerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Property(name) => f.write_str(name),
            Self::Any => f.write_str("*"),
        }
    }
}

/// 监听器注册标识，用于注销
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

/// 站点配置属性变更监听器 trait
///
/// 在写入线程上同步调用；返回错误不会阻止其它监听器执行。
pub trait PropertyChangedListener: Send + Sync {
    /// 处理属性变更事件
    fn on_property_changed(&self, event: &PropertyChangeEvent) -> ListenerResult;

    /// 获取监听器名称
    fn name(&self) -> &str;

    /// 是否启用
    fn is_enabled(&self) -> bool {
        true
    }
}

/// 基于闭包的监听器
pub struct FnPropertyListener<F> {
    name: String,
    callback: F,
}

impl<F> FnPropertyListener<F>
where
    F: Fn(&PropertyChangeEvent) -> ListenerResult + Send + Sync,
{
    /// 使用名称和回调创建监听器
    pub fn new(name: impl Into<String>, callback: F) -> Self {
        Self {
            name: name.into(),
            callback,
        }
    }
}

impl<F> fmt::Debug for FnPropertyListener<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnPropertyListener")
            .field("name", &self.name)
            .finish()
    }
}

impl<F> PropertyChangedListener for FnPropertyListener<F>
where
    F: Fn(&PropertyChangeEvent) -> ListenerResult + Send + Sync,
{
    fn on_property_changed(&self, event: &PropertyChangeEvent) -> ListenerResult {
        (self.callback)(event)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 测试监听器键的匹配规则
    #[test]
    fn test_listener_key_matching() {
        let key = ListenerKey::property("timeout");
        assert!(key.matches("timeout"));
        assert!(!key.matches("retries"));
        assert!(ListenerKey::Any.matches("anything"));
    }

    /// 测试闭包监听器转发事件
    #[test]
    fn test_fn_listener_forwards_event() {
        let listener = FnPropertyListener::new("reject", |event: &PropertyChangeEvent| {
            if event.new_value == "bad" {
                Err("rejected".into())
            } else {
                Ok(())
            }
        });

        let good = PropertyChangeEvent::new("p", None, "ok", "admin");
        let bad = PropertyChangeEvent::new("p", Some("ok".to_string()), "bad", "admin");
        assert!(listener.on_property_changed(&good).is_ok());
        assert!(listener.on_property_changed(&bad).is_err());
        assert!(good.is_created());
        assert!(!bad.is_created());
    }
}
