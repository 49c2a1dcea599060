//! 配置属性合并器实现

use crate::parser::parse_properties;
use config_abstractions::{MergedProperties, PropertySource};
use infrastructure_common::{SiteConfigError, SiteConfigResult, SourceFailure};
use std::io::ErrorKind;
use tracing::{debug, error};

/// 属性合并器
///
/// 按顺序读取每个配置源并合并，后面的源覆盖前面的同名键。
/// 单个文件失败不会中断合并，但只要有失败就整体报告初始化错误。
#[derive(Debug, Default, Clone, Copy)]
pub struct PropertyMerger;

impl PropertyMerger {
    /// 创建新的合并器
    pub fn new() -> Self {
        Self
    }

    /// 读取并解析单个配置源
    pub fn load_source(&self, source: &PropertySource) -> Result<Vec<(String, String)>, SourceFailure> {
        debug!("加载配置文件: {} ({:?})", source.path.display(), source.kind);

        let content = std::fs::read_to_string(&source.path).map_err(|e| {
            let reason = match e.kind() {
                ErrorKind::NotFound => "文件在扫描后被删除".to_string(),
                ErrorKind::InvalidData => "文件不是有效的 UTF-8 文本".to_string(),
                _ => format!("文件读取失败: {}", e),
            };
            SourceFailure::new(&source.path, reason)
        })?;

        parse_properties(&content)
            .map_err(|e| SourceFailure::new(&source.path, format!("解析失败: {}", e)))
    }

    /// 合并所有配置源
    pub fn merge(&self, sources: &[PropertySource]) -> SiteConfigResult<MergedProperties> {
        let mut merged = MergedProperties::new();
        let mut failures = Vec::new();

        for source in sources {
            match self.load_source(source) {
                Ok(entries) => {
                    debug!(
                        "合并 {} 个属性: {}",
                        entries.len(),
                        source.path.display()
                    );
                    merged.extend(entries);
                }
                Err(failure) => {
                    error!("配置文件加载失败: {}", failure);
                    failures.push(failure);
                }
            }
        }

        if failures.is_empty() {
            debug!("合并完成，共 {} 个属性", merged.len());
            Ok(merged)
        } else {
            Err(SiteConfigError::aggregated(failures))
        }
    }
}
