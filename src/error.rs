//! 全局错误类型定义
//! 规则编译期（词法/语法/正则）的所有错误，求值阶段不产生错误

use regex::Error as RegexError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// DSL 错误枚举
/// 每个变体都携带出错位置的原始文本（过长时截断），便于定位规则问题
#[derive(Error, Debug)]
pub enum DslError {
    // ===================== 词法错误 =====================
    /// 引号文本在输入结束前未闭合
    #[error("文本未闭合：{0}")]
    UnterminatedText(String),

    /// 操作符起始字符无法匹配操作符表
    #[error("无效操作符：{0}")]
    InvalidOperator(String),

    /// 既不是关键字也不属于其他任何token类别
    #[error("未知token：{0}")]
    UnknownToken(String),

    /// 数字字面量超出 i64 范围
    #[error("无效数字：{0}")]
    InvalidNumber(String),

    // ===================== 语法错误 =====================
    /// 游标越过token序列末尾
    #[error("token已耗尽，位置{0}")]
    ExhaustedTokens(usize),

    /// 字段/操作符/字面量类型不匹配、括号未闭合、表达式后有多余token、表达式过深
    #[error("语法错误：{0}")]
    SyntaxError(String),

    /// `~=` 右侧文本不是合法正则
    #[error("正则编译失败：{0}")]
    PatternCompileError(#[from] RegexError),

    // ===================== 指纹库错误 =====================
    /// 指纹定义JSON解析失败
    #[error("JSON解析失败：{0}")]
    JsonError(#[from] SerdeJsonError),
}

/// 错误类别（不含消息），便于调用方按类别分支
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnterminatedText,
    InvalidOperator,
    UnknownToken,
    InvalidNumber,
    ExhaustedTokens,
    SyntaxError,
    PatternCompileError,
    JsonError,
}

impl DslError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DslError::UnterminatedText(_) => ErrorKind::UnterminatedText,
            DslError::InvalidOperator(_) => ErrorKind::InvalidOperator,
            DslError::UnknownToken(_) => ErrorKind::UnknownToken,
            DslError::InvalidNumber(_) => ErrorKind::InvalidNumber,
            DslError::ExhaustedTokens(_) => ErrorKind::ExhaustedTokens,
            DslError::SyntaxError(_) => ErrorKind::SyntaxError,
            DslError::PatternCompileError(_) => ErrorKind::PatternCompileError,
            DslError::JsonError(_) => ErrorKind::JsonError,
        }
    }

    /// 是否为词法阶段错误
    pub fn is_lex_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::UnterminatedText
                | ErrorKind::InvalidOperator
                | ErrorKind::UnknownToken
                | ErrorKind::InvalidNumber
        )
    }
}

// 全局Result类型
pub type DslResult<T> = Result<T, DslError>;
