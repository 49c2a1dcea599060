//! 配置文件扫描器实现

use config_abstractions::{PropertySource, STANDARD_PROPERTIES_SUFFIX};
use infrastructure_common::{SiteConfigError, SiteConfigResult};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// 配置文件扫描器
///
/// 按位置列表顺序枚举候选配置文件。同一目录内标准文件排在覆盖文件之前，
/// 目录内的文件按文件名排序。不存在或无法读取的位置会被跳过。
#[derive(Debug, Clone)]
pub struct PropertySourceScanner {
    pattern: String,
    matcher: Regex,
}

impl PropertySourceScanner {
    /// 使用自定义覆盖文件名模式创建扫描器
    ///
    /// 模式需要匹配完整的文件名。
    pub fn new(pattern: &str) -> SiteConfigResult<Self> {
        let matcher = Regex::new(&format!("^(?:{})$", pattern)).map_err(|source| {
            SiteConfigError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            }
        })?;

        Ok(Self {
            pattern: pattern.to_string(),
            matcher,
        })
    }

    /// 获取当前模式
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// 判断文件名是否为自定义覆盖文件
    pub fn is_custom_override(&self, file_name: &str) -> bool {
        self.matcher.is_match(file_name)
    }

    /// 判断文件名是否为标准配置文件
    pub fn is_standard(file_name: &str) -> bool {
        file_name.len() > STANDARD_PROPERTIES_SUFFIX.len()
            && file_name.ends_with(STANDARD_PROPERTIES_SUFFIX)
    }

    /// 将位置解析为绝对路径
    pub fn resolve_location(root: Option<&Path>, location: &str) -> SiteConfigResult<PathBuf> {
        let path = Path::new(location);
        if path.is_absolute() {
            return Ok(path.to_path_buf());
        }

        match root {
            Some(root) => Ok(root.join(path)),
            None => Err(SiteConfigError::initialization(format!(
                "未设置配置根路径，无法解析相对位置: {}",
                location
            ))),
        }
    }

    /// 扫描所有位置
    pub fn scan(
        &self,
        root: Option<&Path>,
        locations: &[String],
    ) -> SiteConfigResult<Vec<PropertySource>> {
        if let Some(root) = root {
            if !root.is_dir() {
                return Err(SiteConfigError::initialization(format!(
                    "配置根路径不可读: {}",
                    root.display()
                )));
            }
        }

        let mut sources = Vec::new();
        for location in locations {
            let resolved = Self::resolve_location(root, location)?;
            sources.extend(self.scan_location(&resolved));
        }

        debug!("扫描完成，共 {} 个候选配置文件", sources.len());
        Ok(sources)
    }

    /// 扫描单个位置
    fn scan_location(&self, location: &Path) -> Vec<PropertySource> {
        let metadata = match fs::metadata(location) {
            Ok(metadata) => metadata,
            Err(_) => {
                debug!("配置位置不存在，跳过: {}", location.display());
                return Vec::new();
            }
        };

        if metadata.is_file() {
            debug!("配置位置是单个文件: {}", location.display());
            return vec![PropertySource::standard(location)];
        }

        let entries = match fs::read_dir(location) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("配置位置无法读取，跳过: {}: {}", location.display(), e);
                return Vec::new();
            }
        };

        let mut files: Vec<(String, PathBuf)> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| is_regular_file(path))
            .filter_map(|path| {
                let name = path.file_name()?.to_str()?.to_string();
                Some((name, path))
            })
            .collect();
        files.sort_by(|a, b| a.0.cmp(&b.0));

        let mut standard = Vec::new();
        let mut overrides = Vec::new();
        for (name, path) in files {
            if self.is_custom_override(&name) {
                debug!("发现自定义覆盖文件: {}", path.display());
                overrides.push(PropertySource::custom_override(path));
            } else if Self::is_standard(&name) {
                debug!("发现标准配置文件: {}", path.display());
                standard.push(PropertySource::standard(path));
            }
        }

        standard.extend(overrides);
        standard
    }
}

/// 路径存在且是普通文件（跟随符号链接，悬空链接视为不存在）
fn is_regular_file(path: &Path) -> bool {
    fs::metadata(path)
        .map(|metadata| metadata.is_file())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config_abstractions::{SourceKind, DEFAULT_CUSTOM_PROPERTIES_PATTERN};
    use tempfile::TempDir;

    fn scanner() -> PropertySourceScanner {
        PropertySourceScanner::new(DEFAULT_CUSTOM_PROPERTIES_PATTERN).unwrap()
    }

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), "key=value\n").unwrap();
    }

    fn names(sources: &[PropertySource]) -> Vec<(String, SourceKind)> {
        sources
            .iter()
            .map(|s| {
                (
                    s.path.file_name().unwrap().to_string_lossy().to_string(),
                    s.kind,
                )
            })
            .collect()
    }

    /// 测试标准文件与覆盖文件的分类
    #[test]
    fn test_classification() {
        let scanner = scanner();
        assert!(scanner.is_custom_override("foo-config.properties"));
        assert!(!scanner.is_custom_override("foo.properties"));
        assert!(!scanner.is_custom_override("foo-config.properties.bak"));
        assert!(PropertySourceScanner::is_standard("foo.properties"));
        assert!(!PropertySourceScanner::is_standard("foo.yaml"));
        assert!(!PropertySourceScanner::is_standard(".properties"));
    }

    /// 测试无效的正则模式被拒绝
    #[test]
    fn test_invalid_pattern_is_rejected() {
        let result = PropertySourceScanner::new("([unclosed");
        assert!(matches!(
            result,
            Err(SiteConfigError::InvalidPattern { .. })
        ));
    }

    /// 测试同一目录内标准文件排在覆盖文件之前
    #[test]
    fn test_standard_files_precede_overrides_within_directory() {
        let root = TempDir::new().unwrap();
        let site = root.path().join("site");
        fs::create_dir(&site).unwrap();
        touch(&site, "a-config.properties");
        touch(&site, "b.properties");
        touch(&site, "a.properties");
        touch(&site, "notes.txt");

        let sources = scanner()
            .scan(Some(root.path()), &["site".to_string()])
            .unwrap();

        assert_eq!(
            names(&sources),
            vec![
                ("a.properties".to_string(), SourceKind::Standard),
                ("b.properties".to_string(), SourceKind::Standard),
                ("a-config.properties".to_string(), SourceKind::CustomOverride),
            ]
        );
    }

    /// 测试保持位置列表顺序并跳过不存在的位置
    #[test]
    fn test_locations_keep_list_order_and_skip_missing() {
        let root = TempDir::new().unwrap();
        for dir in ["base", "site"] {
            fs::create_dir(root.path().join(dir)).unwrap();
        }
        touch(&root.path().join("base"), "app.properties");
        touch(&root.path().join("site"), "app.properties");

        let locations = vec![
            "site".to_string(),
            "optional".to_string(),
            "base".to_string(),
        ];
        let sources = scanner().scan(Some(root.path()), &locations).unwrap();

        assert_eq!(sources.len(), 2);
        assert!(sources[0].path.starts_with(root.path().join("site")));
        assert!(sources[1].path.starts_with(root.path().join("base")));
    }

    /// 测试忽略名称形如配置文件的目录
    #[test]
    fn test_directories_named_like_properties_are_ignored() {
        let root = TempDir::new().unwrap();
        fs::create_dir(root.path().join("nested-config.properties")).unwrap();
        touch(root.path(), "app.properties");

        let location = root.path().to_string_lossy().to_string();
        let sources = scanner().scan(None, &[location]).unwrap();

        assert_eq!(names(&sources), vec![("app.properties".to_string(), SourceKind::Standard)]);
    }

    /// 测试悬空的符号链接不会被当作配置文件
    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_skipped() {
        let root = TempDir::new().unwrap();
        touch(root.path(), "a.properties");
        std::os::unix::fs::symlink(
            root.path().join("missing.properties"),
            root.path().join("x-config.properties"),
        )
        .unwrap();

        let location = root.path().to_string_lossy().to_string();
        let sources = scanner().scan(None, &[location]).unwrap();

        assert_eq!(names(&sources), vec![("a.properties".to_string(), SourceKind::Standard)]);
    }

    /// 测试文件位置作为单个标准配置源
    #[test]
    fn test_file_location_is_a_single_standard_source() {
        let root = TempDir::new().unwrap();
        touch(root.path(), "single.properties");

        let sources = scanner()
            .scan(Some(root.path()), &["single.properties".to_string()])
            .unwrap();

        assert_eq!(sources, vec![PropertySource::standard(root.path().join("single.properties"))]);
    }

    /// 测试未设置根路径时相对位置报错
    #[test]
    fn test_relative_location_without_root_fails() {
        let result = scanner().scan(None, &["base".to_string()]);
        assert!(matches!(result, Err(SiteConfigError::Initialization { .. })));
    }

    /// 测试根路径不存在时报错
    #[test]
    fn test_missing_root_fails() {
        let root = TempDir::new().unwrap();
        let missing = root.path().join("does-not-exist");
        let result = scanner().scan(Some(&missing), &["base".to_string()]);
        assert!(matches!(result, Err(SiteConfigError::Initialization { .. })));
    }
}
