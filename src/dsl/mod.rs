//! 指纹规则DSL：词法分析 → token游标 → 语法解析 → 语法树求值
pub mod token;
pub mod cursor;
pub mod parser;
pub mod ast;
pub mod trace;

pub use self::token::{tokenize, tokenize_with_keywords, Token, TokenKind};
pub use self::cursor::TokenCursor;
pub use self::parser::{Parser, MAX_DEPTH};
pub use self::ast::{
    Expr, LogicExpr, LogicOp, NumField, NumOp, NumberMatch, StrField, StrOp, StringMatch,
};
pub use self::trace::{EvalTracer, LogTracer, NoopTracer, RecordingTracer, TraceEvent};
