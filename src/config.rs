//! 全局配置管理，存储规则编译与求值的可配置项

use once_cell::sync::Lazy;

/// 默认字段关键字
pub const DEFAULT_KEYWORDS: [&str; 4] = ["status", "body", "header", "icon"];

/// 进程级默认配置
static DEFAULT_CONFIG: Lazy<DslConfig> = Lazy::new(DslConfig::default);

/// 全局配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DslConfig {
    // 词法分析可识别的关键字列表
    pub keywords: Vec<String>,
    // 是否在求值时输出诊断日志
    pub trace: bool,
}

impl Default for DslConfig {
    fn default() -> Self {
        Self {
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            trace: false,
        }
    }
}

/// 配置管理器
pub struct ConfigManager;

impl ConfigManager {
    /// 获取默认配置
    pub fn get_default() -> &'static DslConfig {
        &DEFAULT_CONFIG
    }

    /// 自定义配置
    pub fn custom() -> CustomConfigBuilder {
        CustomConfigBuilder::new()
    }
}

/// 配置构建器（便于自定义配置）
#[derive(Debug, Clone, Default)]
pub struct CustomConfigBuilder {
    config: DslConfig,
}

impl CustomConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: DslConfig::default(),
        }
    }

    /// 整体替换关键字列表
    pub fn keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// 追加单个关键字（已存在时忽略）
    pub fn add_keyword(mut self, keyword: impl Into<String>) -> Self {
        let keyword = keyword.into();
        if !self.config.keywords.contains(&keyword) {
            self.config.keywords.push(keyword);
        }
        self
    }

    pub fn trace(mut self, trace: bool) -> Self {
        self.config.trace = trace;
        self
    }

    pub fn build(self) -> DslConfig {
        self.config
    }
}
