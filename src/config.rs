use serde::Deserialize;

use crate::error::ConfigError;
use crate::link_router::CaretHitZone;

pub const DEFAULT_LINK_PREFIX: &str = "/docs/";
pub const DEFAULT_FRAGMENT_SUFFIX: &str = ".ajax";
pub const DEFAULT_CACHE_CAPACITY: usize = 20;
pub const DEFAULT_LOADING_DELAY_MS: u32 = 750;

/// 页面上 `<meta name="docs-viewer-config">` 的名字
pub const CONFIG_META_NAME: &str = "docs-viewer-config";

/// 查看器配置，缺省字段取默认值
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub link_prefix: String,
    pub fragment_suffix: String,
    pub cache_capacity: usize,
    pub loading_delay_ms: u32,
    pub caret_hit_zone: CaretHitZone,
    pub selectors: Selectors,
    pub log_level: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Selectors {
    pub content: String,
    pub tree: String,
    pub popup_trigger: String,
    pub popup_menu: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            content: "#article".to_string(),
            tree: ".directory".to_string(),
            popup_trigger: "#hamburger".to_string(),
            popup_menu: ".directory".to_string(),
        }
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            link_prefix: DEFAULT_LINK_PREFIX.to_string(),
            fragment_suffix: DEFAULT_FRAGMENT_SUFFIX.to_string(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            loading_delay_ms: DEFAULT_LOADING_DELAY_MS,
            caret_hit_zone: CaretHitZone::default(),
            selectors: Selectors::default(),
            log_level: "info".to_string(),
        }
    }
}

impl ViewerConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: ViewerConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "cache_capacity",
                reason: "必须大于 0",
            });
        }
        if self.fragment_suffix.is_empty() {
            return Err(ConfigError::Invalid {
                field: "fragment_suffix",
                reason: "不能为空",
            });
        }
        if !self.link_prefix.starts_with('/') {
            return Err(ConfigError::Invalid {
                field: "link_prefix",
                reason: "必须以 / 开头",
            });
        }
        if self.caret_hit_zone.marker_left < self.caret_hit_zone.marker_right {
            return Err(ConfigError::Invalid {
                field: "caret_hit_zone",
                reason: "marker_left 不能小于 marker_right",
            });
        }
        Ok(())
    }

    /// 无法识别的级别按 info 处理
    pub fn level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}
