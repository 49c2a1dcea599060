//! 站点配置管理器实现

use crate::event_handler::PropertyChangeNotifier;
use crate::merger::PropertyMerger;
use crate::options::SiteConfigurationOptions;
use crate::scanner::PropertySourceScanner;
use arc_swap::ArcSwapOption;
use config_abstractions::{
    ListenerId, ListenerKey, MergedProperties, PropertyChangeEvent, PropertyChangedListener,
    SiteConfigurationService, SiteSnapshot, SourceSettings,
};
use infrastructure_common::{SiteConfigError, SiteConfigResult};
use parking_lot::{ReentrantMutex, RwLock};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info};

/// 站点配置管理器
///
/// 合并结果以快照形式发布：新的属性集合在旁边完整构建，再一次性替换，
/// 读者无需加锁，只会看到完整的旧快照或完整的新快照。
/// 初始化、更新、重置和属性写入由同一把写锁串行化，监听器在持锁期间同步执行。
pub struct SiteConfigurationManager {
    /// 待用的配置源设置，setter 只修改这里
    settings: RwLock<SourceSettings>,
    /// 当前发布的快照，未初始化时为空
    current: ArcSwapOption<SiteSnapshot>,
    /// 写操作互斥锁（可重入，监听器可以在回调中再次写入）
    write_lock: ReentrantMutex<()>,
    merger: PropertyMerger,
    notifier: PropertyChangeNotifier,
}

impl std::fmt::Debug for SiteConfigurationManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteConfigurationManager")
            .field("settings", &*self.settings.read())
            .field("initialized", &self.is_initialized())
            .field("notifier", &self.notifier)
            .finish()
    }
}

impl SiteConfigurationManager {
    /// 创建未设置任何位置的管理器
    pub fn new() -> Self {
        Self::from_settings_unchecked(SourceSettings::default())
    }

    /// 使用配置源设置创建管理器，覆盖文件模式必须有效
    pub fn with_settings(settings: SourceSettings) -> SiteConfigResult<Self> {
        PropertySourceScanner::new(&settings.custom_properties_pattern)?;
        Ok(Self::from_settings_unchecked(settings))
    }

    /// 使用服务选项创建管理器
    pub fn from_options(options: &SiteConfigurationOptions) -> SiteConfigResult<Self> {
        Self::with_settings(options.to_source_settings())
    }

    fn from_settings_unchecked(settings: SourceSettings) -> Self {
        Self {
            settings: RwLock::new(settings),
            current: ArcSwapOption::empty(),
            write_lock: ReentrantMutex::new(()),
            merger: PropertyMerger::new(),
            notifier: PropertyChangeNotifier::new(),
        }
    }

    /// 获取属性变更通知器
    pub fn notifier(&self) -> &PropertyChangeNotifier {
        &self.notifier
    }

    /// 获取待用的配置源设置
    pub fn settings(&self) -> SourceSettings {
        self.settings.read().clone()
    }

    /// 按给定设置扫描并合并，不修改任何状态
    fn build_snapshot(&self, settings: &SourceSettings) -> SiteConfigResult<SiteSnapshot> {
        let scanner = PropertySourceScanner::new(&settings.custom_properties_pattern)?;
        let sources = scanner.scan(settings.root.as_deref(), &settings.locations)?;
        let properties = self.merger.merge(&sources)?;

        Ok(SiteSnapshot {
            root: settings.root.clone(),
            locations: settings.locations.clone(),
            custom_properties_pattern: settings.custom_properties_pattern.clone(),
            properties: Arc::new(properties),
            built_at: chrono::Utc::now(),
        })
    }

    /// 按给定设置构建并发布快照，调用方必须持有写锁
    fn rebuild_locked(&self, settings: &SourceSettings) -> SiteConfigResult<Arc<SiteSnapshot>> {
        match self.build_snapshot(settings) {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                self.current.store(Some(snapshot.clone()));
                info!(
                    "站点配置初始化完成: {} 个属性, {} 个位置",
                    snapshot.properties.len(),
                    snapshot.locations.len()
                );
                Ok(snapshot)
            }
            Err(e) => {
                self.current.store(None);
                error!("站点配置初始化失败: {}", e);
                Err(e)
            }
        }
    }

    /// 调用方必须持有写锁
    fn initialize_locked(&self) -> SiteConfigResult<Arc<SiteSnapshot>> {
        if let Some(snapshot) = self.current.load_full() {
            debug!("站点配置已初始化，跳过");
            return Ok(snapshot);
        }
        let settings = self.settings();
        self.rebuild_locked(&settings)
    }

    /// 获取当前快照，未初始化时按需初始化
    fn resolve_snapshot(&self) -> SiteConfigResult<Arc<SiteSnapshot>> {
        if let Some(snapshot) = self.current.load_full() {
            return Ok(snapshot);
        }

        let _guard = self.write_lock.lock();
        self.initialize_locked().map_err(|e| {
            SiteConfigError::resolution(format!("无法按需初始化站点配置: {}", e))
        })
    }
}

impl Default for SiteConfigurationManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteConfigurationService for SiteConfigurationManager {
    fn initialize(&self) -> SiteConfigResult<()> {
        let _guard = self.write_lock.lock();
        self.initialize_locked().map(|_| ())
    }

    fn update(
        &self,
        root: Option<PathBuf>,
        locations: Option<Vec<String>>,
    ) -> SiteConfigResult<Arc<MergedProperties>> {
        let _guard = self.write_lock.lock();
        // 同一份设置既写回待用设置又用于构建，并发的 setter 不会混入本次更新
        let settings = {
            let mut pending = self.settings.write();
            if let Some(root) = root {
                info!("更新配置根路径: {}", root.display());
                pending.root = Some(root);
            }
            if let Some(locations) = locations {
                info!("更新配置位置列表: {:?}", locations);
                pending.locations = locations;
            }
            pending.clone()
        };

        let snapshot = self.rebuild_locked(&settings)?;
        Ok(snapshot.properties.clone())
    }

    fn reset(&self) {
        let _guard = self.write_lock.lock();
        if self.current.swap(None).is_some() {
            info!("站点配置已重置");
        }
    }

    fn is_initialized(&self) -> bool {
        self.current.load().is_some()
    }

    fn properties(&self) -> SiteConfigResult<Arc<MergedProperties>> {
        self.current
            .load_full()
            .map(|snapshot| snapshot.properties.clone())
            .ok_or_else(|| SiteConfigError::resolution("站点配置尚未初始化"))
    }

    fn snapshot(&self) -> Option<Arc<SiteSnapshot>> {
        self.current.load_full()
    }

    fn get_property(&self, property: &str) -> SiteConfigResult<Option<String>> {
        let snapshot = self.resolve_snapshot()?;
        Ok(snapshot.properties.get(property).map(str::to_string))
    }

    fn set_property(&self, username: &str, property: &str, value: &str) -> SiteConfigResult<()> {
        let _guard = self.write_lock.lock();
        let snapshot = self.initialize_locked().map_err(|e| {
            SiteConfigError::resolution(format!("无法按需初始化站点配置: {}", e))
        })?;

        let mut properties = (*snapshot.properties).clone();
        let old_value = properties.insert(property, value);
        self.current.store(Some(Arc::new(SiteSnapshot {
            properties: Arc::new(properties),
            built_at: chrono::Utc::now(),
            ..(*snapshot).clone()
        })));
        info!("用户 {} 设置站点配置属性: {}", username, property);

        if old_value.as_deref() == Some(value) {
            debug!("属性值未变化，不通知监听器: {}", property);
            return Ok(());
        }

        let event = PropertyChangeEvent::new(property, old_value, value, username);
        self.notifier
            .notify(&event)
            .map_err(|failures| SiteConfigError::Write {
                property: property.to_string(),
                failures,
            })
    }

    fn config_files_locations(&self) -> Vec<String> {
        self.settings.read().locations.clone()
    }

    fn set_config_files_locations(&self, locations: Vec<String>) {
        debug!("设置配置位置列表（未重新加载）: {:?}", locations);
        self.settings.write().locations = locations;
    }

    fn config_files_locations_root(&self) -> Option<PathBuf> {
        self.settings.read().root.clone()
    }

    fn set_config_files_locations_root(&self, root: PathBuf) {
        debug!("设置配置根路径（未重新加载）: {}", root.display());
        self.settings.write().root = Some(root);
    }

    fn custom_properties_name_pattern(&self) -> String {
        self.settings.read().custom_properties_pattern.clone()
    }

    fn set_custom_properties_name_pattern(&self, pattern: &str) -> SiteConfigResult<()> {
        PropertySourceScanner::new(pattern)?;
        debug!("设置自定义覆盖文件名模式（未重新加载）: {}", pattern);
        self.settings.write().custom_properties_pattern = pattern.to_string();
        Ok(())
    }

    fn register_listener(
        &self,
        key: ListenerKey,
        listener: Arc<dyn PropertyChangedListener>,
    ) -> ListenerId {
        self.notifier.register(key, listener)
    }

    fn unregister_listener(&self, id: ListenerId) -> bool {
        self.notifier.unregister(id)
    }
}
