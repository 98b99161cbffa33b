//! fingerdsl - 指纹规则匹配DSL
//!
//! 规则示例：`status==200 && (header="nginx" || body="nginx")`
//!
//! ```
//! use fingerdsl::{Observation, Rule};
//!
//! let rule = Rule::compile(r#"status==200 && (header="nginx" || body="nginx")"#).unwrap();
//! let obs = Observation::new().status(200).header("Server: Nginx");
//! assert!(rule.evaluate(&obs));
//! ```

// 导出全局错误类型
pub use self::error::{DslError, DslResult, ErrorKind};

// 导出配置模块
pub use self::config::{ConfigManager, CustomConfigBuilder, DslConfig, DEFAULT_KEYWORDS};

// 导出规则门面与观测记录
pub use self::observation::Observation;
pub use self::rule::Rule;

// 导出指纹库
pub use self::fingerprint::{
    CompileStats, Fingerprint, FingerprintDef, FingerprintLibrary, RejectedRule,
};

// 声明所有子模块
pub mod config;
pub mod error;
pub mod dsl;
pub mod observation;
pub mod rule;
pub mod fingerprint;
