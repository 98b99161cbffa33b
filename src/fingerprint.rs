//! 指纹库：批量编译命名规则，对同一观测记录逐条匹配
//! 编译失败的规则直接跳过并记录原因，不做重试

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::DslConfig;
use crate::error::DslResult;
use crate::observation::Observation;
use crate::rule::Rule;

/// 指纹定义（未编译）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintDef {
    pub name: String,
    pub rule: String,
}

impl FingerprintDef {
    pub fn new(name: impl Into<String>, rule: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rule: rule.into(),
        }
    }
}

/// 编译后的指纹
#[derive(Debug, Clone)]
pub struct Fingerprint {
    pub name: String,
    pub rule: Rule,
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.rule)
    }
}

/// 被拒绝的规则及原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRule {
    pub name: String,
    pub reason: String,
}

/// 编译统计
#[derive(Debug, Clone, Default)]
pub struct CompileStats {
    pub total: usize,
    pub compiled: usize,
    pub rejected: Vec<RejectedRule>,
}

/// 指纹库
#[derive(Debug, Clone, Default)]
pub struct FingerprintLibrary {
    fingerprints: Vec<Fingerprint>,
}

impl FingerprintLibrary {
    /// 编译全部定义，失败的规则计入统计后跳过
    pub fn compile<I>(defs: I, config: &DslConfig) -> (Self, CompileStats)
    where
        I: IntoIterator<Item = FingerprintDef>,
    {
        let start = Instant::now();
        let mut stats = CompileStats::default();
        let mut fingerprints = Vec::new();

        for def in defs {
            stats.total += 1;
            match Rule::compile_with(&def.rule, config) {
                Ok(rule) => {
                    fingerprints.push(Fingerprint { name: def.name, rule });
                    stats.compiled += 1;
                }
                Err(e) => {
                    warn!("指纹规则编译失败 [{}]：{}", def.name, e);
                    stats.rejected.push(RejectedRule {
                        name: def.name,
                        reason: e.to_string(),
                    });
                }
            }
        }

        debug!(
            "指纹库编译完成，耗时{:?}，共{}条，成功{}条，拒绝{}条",
            start.elapsed(),
            stats.total,
            stats.compiled,
            stats.rejected.len()
        );

        (Self { fingerprints }, stats)
    }

    /// 从内存中的JSON数组解析定义后编译
    pub fn from_json(json: &str, config: &DslConfig) -> DslResult<(Self, CompileStats)> {
        let defs: Vec<FingerprintDef> = serde_json::from_str(json)?;
        Ok(Self::compile(defs, config))
    }

    /// 返回所有命中的指纹名称，按定义顺序
    pub fn detect(&self, obs: &Observation) -> Vec<&str> {
        self.fingerprints
            .iter()
            .filter(|fp| fp.rule.evaluate(obs))
            .map(|fp| fp.name.as_str())
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&Fingerprint> {
        self.fingerprints.iter().find(|fp| fp.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Fingerprint> {
        self.fingerprints.iter()
    }

    pub fn len(&self) -> usize {
        self.fingerprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fingerprints.is_empty()
    }
}
