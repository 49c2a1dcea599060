//! 属性变更通知器实现

use config_abstractions::events::{
    ListenerId, ListenerKey, ListenerResult, PropertyChangeEvent, PropertyChangedListener,
};
use parking_lot::RwLock;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

struct Registration {
    id: ListenerId,
    key: ListenerKey,
    listener: Arc<dyn PropertyChangedListener>,
}

/// 通知统计
#[derive(Debug, Default)]
pub struct NotifierStats {
    events: AtomicU64,
    invocations: AtomicU64,
    failures: AtomicU64,
}

impl NotifierStats {
    /// 已分发的事件数
    pub fn events(&self) -> u64 {
        self.events.load(Ordering::Relaxed)
    }

    /// 监听器被调用的总次数
    pub fn invocations(&self) -> u64 {
        self.invocations.load(Ordering::Relaxed)
    }

    /// 监听器失败的总次数
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    /// 重置计数器
    pub fn reset(&self) {
        self.events.store(0, Ordering::Relaxed);
        self.invocations.store(0, Ordering::Relaxed);
        self.failures.store(0, Ordering::Relaxed);
    }
}

/// 属性变更通知器
///
/// 按注册顺序在调用线程上同步分发事件，匹配属性名的监听器和通配监听器都会收到。
/// 注册与站点配置的重置、重新初始化无关。
pub struct PropertyChangeNotifier {
    registrations: RwLock<Vec<Registration>>,
    next_id: AtomicU64,
    stats: NotifierStats,
}

impl std::fmt::Debug for PropertyChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyChangeNotifier")
            .field("listener_count", &self.listener_count())
            .field("stats", &self.stats)
            .finish()
    }
}

impl PropertyChangeNotifier {
    /// 创建新的通知器
    pub fn new() -> Self {
        Self {
            registrations: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
            stats: NotifierStats::default(),
        }
    }

    /// 注册监听器
    pub fn register(
        &self,
        key: ListenerKey,
        listener: Arc<dyn PropertyChangedListener>,
    ) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        info!("注册属性变更监听器: {} -> {}", listener.name(), key);

        self.registrations.write().push(Registration { id, key, listener });
        id
    }

    /// 注销监听器
    pub fn unregister(&self, id: ListenerId) -> bool {
        let mut registrations = self.registrations.write();
        let before = registrations.len();
        registrations.retain(|r| r.id != id);

        let removed = registrations.len() < before;
        if removed {
            info!("移除属性变更监听器: {:?}", id);
        } else {
            warn!("属性变更监听器不存在: {:?}", id);
        }
        removed
    }

    /// 按名称注销监听器，返回移除的数量
    pub fn unregister_by_name(&self, name: &str) -> usize {
        let mut registrations = self.registrations.write();
        let before = registrations.len();
        registrations.retain(|r| r.listener.name() != name);
        before - registrations.len()
    }

    /// 获取监听器数量
    pub fn listener_count(&self) -> usize {
        self.registrations.read().len()
    }

    /// 获取所有监听器名称（按注册顺序）
    pub fn listener_names(&self) -> Vec<String> {
        self.registrations
            .read()
            .iter()
            .map(|r| r.listener.name().to_string())
            .collect()
    }

    /// 获取通知统计
    pub fn stats(&self) -> &NotifierStats {
        &self.stats
    }

    /// 分发属性变更事件
    ///
    /// 所有匹配的监听器都会被调用；有监听器失败时返回失败描述列表。
    pub fn notify(&self, event: &PropertyChangeEvent) -> Result<(), Vec<String>> {
        let targets: Vec<Arc<dyn PropertyChangedListener>> = self
            .registrations
            .read()
            .iter()
            .filter(|r| r.key.matches(&event.property))
            .map(|r| r.listener.clone())
            .collect();

        self.stats.events.fetch_add(1, Ordering::Relaxed);

        let mut failures = Vec::new();
        for listener in targets {
            if !listener.is_enabled() {
                continue;
            }

            debug!("向监听器 {} 分发属性变更: {}", listener.name(), event.property);
            self.stats.invocations.fetch_add(1, Ordering::Relaxed);

            let outcome = catch_unwind(AssertUnwindSafe(|| listener.on_property_changed(event)));
            let failure = match outcome {
                Ok(Ok(())) => None,
                Ok(Err(e)) => Some(format!("{}: {}", listener.name(), e)),
                Err(_) => Some(format!("{}: 监听器发生 panic", listener.name())),
            };

            if let Some(failure) = failure {
                warn!("属性变更监听器失败: {}", failure);
                self.stats.failures.fetch_add(1, Ordering::Relaxed);
                failures.push(failure);
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(failures)
        }
    }
}

impl Default for PropertyChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

/// 日志记录监听器
///
/// 将所有属性变更记录到日志中
#[derive(Debug)]
pub struct LoggingPropertyListener {
    name: String,
}

impl LoggingPropertyListener {
    /// 创建新的日志记录监听器
    pub fn new() -> Self {
        Self {
            name: "LoggingPropertyListener".to_string(),
        }
    }
}

impl Default for LoggingPropertyListener {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertyChangedListener for LoggingPropertyListener {
    fn on_property_changed(&self, event: &PropertyChangeEvent) -> ListenerResult {
        match &event.old_value {
            Some(old) => info!(
                "站点配置更新: {} = {} (原值: {}), 操作用户: {}, 时间: {}",
                event.property, event.new_value, old, event.username, event.timestamp
            ),
            None => info!(
                "站点配置新增: {} = {}, 操作用户: {}, 时间: {}",
                event.property, event.new_value, event.username, event.timestamp
            ),
        }
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// 计数监听器
///
/// 记录被调用的次数和最近一次收到的事件
#[derive(Debug)]
pub struct CountingPropertyListener {
    name: String,
    invoked: AtomicU64,
    last_event: RwLock<Option<PropertyChangeEvent>>,
}

impl CountingPropertyListener {
    /// 创建新的计数监听器
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            invoked: AtomicU64::new(0),
            last_event: RwLock::new(None),
        }
    }

    /// 获取调用次数
    pub fn invoked_count(&self) -> u64 {
        self.invoked.load(Ordering::Relaxed)
    }

    /// 重置调用次数
    pub fn reset_count(&self) {
        self.invoked.store(0, Ordering::Relaxed);
    }

    /// 最近一次收到的事件
    pub fn last_event(&self) -> Option<PropertyChangeEvent> {
        self.last_event.read().clone()
    }
}

impl PropertyChangedListener for CountingPropertyListener {
    fn on_property_changed(&self, event: &PropertyChangeEvent) -> ListenerResult {
        self.invoked.fetch_add(1, Ordering::Relaxed);
        *self.last_event.write() = Some(event.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config_abstractions::events::FnPropertyListener;
    use parking_lot::Mutex;

    fn recorder(
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    ) -> Arc<dyn PropertyChangedListener> {
        Arc::new(FnPropertyListener::new(name, move |event: &PropertyChangeEvent| {
            log.lock().push(format!("{}:{}={}", name, event.property, event.new_value));
            Ok(())
        }))
    }

    /// 测试按注册顺序分发事件
    #[test]
    fn test_dispatch_in_registration_order() {
        let notifier = PropertyChangeNotifier::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        notifier.register(ListenerKey::property("p"), recorder("A", log.clone()));
        notifier.register(ListenerKey::Any, recorder("W", log.clone()));
        notifier.register(ListenerKey::property("p"), recorder("B", log.clone()));
        notifier.register(ListenerKey::property("q"), recorder("Q", log.clone()));

        let event = PropertyChangeEvent::new("p", Some("1".to_string()), "2", "admin");
        notifier.notify(&event).unwrap();

        assert_eq!(*log.lock(), vec!["A:p=2", "W:p=2", "B:p=2"]);
        assert_eq!(notifier.stats().events(), 1);
        assert_eq!(notifier.stats().invocations(), 3);
    }

    /// 测试失败的监听器不影响其他监听器
    #[test]
    fn test_failing_listener_does_not_stop_others() {
        let notifier = PropertyChangeNotifier::new();
        let counter = Arc::new(CountingPropertyListener::new("counter"));
        notifier.register(
            ListenerKey::Any,
            Arc::new(FnPropertyListener::new("failing", |_: &PropertyChangeEvent| {
                Err("boom".into())
            })),
        );
        notifier.register(
            ListenerKey::Any,
            Arc::new(FnPropertyListener::new("panicking", |_: &PropertyChangeEvent| -> ListenerResult {
                panic!("listener panic")
            })),
        );
        notifier.register(ListenerKey::Any, counter.clone());

        let event = PropertyChangeEvent::new("p", None, "1", "admin");
        let failures = notifier.notify(&event).unwrap_err();

        assert_eq!(failures.len(), 2);
        assert!(failures[0].starts_with("failing"));
        assert!(failures[1].starts_with("panicking"));
        assert_eq!(counter.invoked_count(), 1);
        assert_eq!(notifier.stats().failures(), 2);
    }

    /// 测试注销监听器
    #[test]
    fn test_unregister() {
        let notifier = PropertyChangeNotifier::new();
        let counter = Arc::new(CountingPropertyListener::new("counter"));
        let id = notifier.register(ListenerKey::Any, counter.clone());
        notifier.register(ListenerKey::Any, Arc::new(LoggingPropertyListener::new()));
        assert_eq!(notifier.listener_count(), 2);

        assert!(notifier.unregister(id));
        assert!(!notifier.unregister(id));
        assert_eq!(notifier.listener_names(), vec!["LoggingPropertyListener"]);

        notifier
            .notify(&PropertyChangeEvent::new("p", None, "1", "admin"))
            .unwrap();
        assert_eq!(counter.invoked_count(), 0);

        assert_eq!(notifier.unregister_by_name("LoggingPropertyListener"), 1);
        assert_eq!(notifier.listener_count(), 0);
    }

    /// 测试计数监听器记录最近一次事件
    #[test]
    fn test_counting_listener_records_last_event() {
        let listener = CountingPropertyListener::new("counter");
        let event = PropertyChangeEvent::new("p", Some("1".to_string()), "2", "admin");

        listener.on_property_changed(&event).unwrap();
        assert_eq!(listener.invoked_count(), 1);
        assert_eq!(listener.last_event().unwrap().new_value, "2");

        listener.reset_count();
        assert_eq!(listener.invoked_count(), 0);
    }
}
