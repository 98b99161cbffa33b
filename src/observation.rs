//! 观测记录：规则求值的输入
//! 由调用方根据HTTP响应构造，引擎只读不存

use serde::{Deserialize, Serialize};

/// 一次探测的观测结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    /// HTTP状态码
    #[serde(default)]
    pub status: i64,
    /// 响应体文本
    #[serde(default)]
    pub body: String,
    /// 响应头文本（整体拼接）
    #[serde(default)]
    pub header: String,
    /// 图标哈希
    #[serde(default)]
    pub icon: i32,
}

impl Observation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: i64) -> Self {
        self.status = status;
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    pub fn icon(mut self, icon: i32) -> Self {
        self.icon = icon;
        self
    }
}
