//! 递归下降语法解析
//!
//! ```text
//! expr          := primary { (AND | OR) primary }
//! primary       := numberCompare | stringCompare | "(" expr ")"
//! numberCompare := (STATUS | ICON) numOp NUMBER
//! stringCompare := (BODY | HEADER) strOp TEXT
//! numOp         := "==" | "!=" | ">" | ">=" | "<" | "<="
//! strOp         := "=" | "==" | "!=" | "~="
//! ```
//!
//! 逻辑组合默认左结合；但当刚解析出的右操作数是括号表达式时，
//! 括号表达式会被放到左侧优先求值（括号优先级提升）。
//!
//! 语法树深度（逻辑链长度与括号嵌套合计）不超过 [`MAX_DEPTH`]，
//! 求值、渲染、释放语法树时的递归深度因此有界。

use regex::Regex;
use tracing::debug;

use crate::dsl::ast::{Expr, LogicExpr, LogicOp, NumField, NumOp, NumberMatch, StrField, StrOp, StringMatch};
use crate::dsl::cursor::TokenCursor;
use crate::dsl::token::{Token, TokenKind};
use crate::error::{DslError, DslResult};

/// 语法树最大深度，逻辑链与括号嵌套共用
pub const MAX_DEPTH: usize = 256;

pub struct Parser {
    cursor: TokenCursor,
    // 当前括号嵌套层数
    nesting: usize,
}

fn check_depth(depth: usize) -> DslResult<usize> {
    if depth > MAX_DEPTH {
        return Err(DslError::SyntaxError(format!(
            "表达式深度超过{MAX_DEPTH}层，请拆分规则"
        )));
    }
    Ok(depth)
}

impl Parser {
    pub fn new(cursor: TokenCursor) -> Self {
        Self { cursor, nesting: 0 }
    }

    /// 解析完整规则；空token序列返回 `None`
    pub fn parse(mut self) -> DslResult<Option<Expr>> {
        if !self.cursor.has_next() {
            return Ok(None);
        }

        let (root, depth) = self.parse_expr()?;
        if self.cursor.has_next() {
            let trailing: Vec<String> = self
                .cursor
                .remaining()
                .iter()
                .take(8)
                .map(Token::to_string)
                .collect();
            return Err(DslError::SyntaxError(format!(
                "表达式后存在多余token：{}",
                trailing.join(" ")
            )));
        }

        debug!("规则解析完成，节点数{}，深度{}", root.node_count(), depth);
        Ok(Some(root))
    }

    /// 返回 (节点, 深度)，叶子深度为0
    fn parse_expr(&mut self) -> DslResult<(Expr, usize)> {
        let (mut expr, mut depth) = self.parse_primary()?;

        while self.cursor.has_next() {
            let kind = self.cursor.next()?.kind();
            let op = match kind {
                TokenKind::And => LogicOp::And,
                TokenKind::Or => LogicOp::Or,
                _ => {
                    self.cursor.rewind();
                    break;
                }
            };

            let (right, right_depth) = self.parse_primary()?;
            depth = check_depth(1 + depth.max(right_depth))?;
            // 提高括号表达式的优先级
            expr = if right.is_group() {
                Expr::Logic(LogicExpr::new(op, right, expr))
            } else {
                Expr::Logic(LogicExpr::new(op, expr, right))
            };
        }

        Ok((expr, depth))
    }

    fn parse_primary(&mut self) -> DslResult<(Expr, usize)> {
        let token = self.expect_next(|| "缺少表达式".to_string())?;

        let expr = match token.kind() {
            TokenKind::Keyword => match token.literal() {
                "status" => self.parse_number_compare(NumField::Status, &token)?,
                "icon" => self.parse_number_compare(NumField::Icon, &token)?,
                "body" => self.parse_string_compare(StrField::Body, &token)?,
                "header" => self.parse_string_compare(StrField::Header, &token)?,
                _ => return Err(DslError::SyntaxError(format!("意外的token：{token}"))),
            },
            TokenKind::LeftBracket => return self.parse_group(),
            _ => return Err(DslError::SyntaxError(format!("意外的token：{token}"))),
        };
        Ok((expr, 0))
    }

    fn parse_group(&mut self) -> DslResult<(Expr, usize)> {
        // 进入递归前先限制嵌套层数
        if self.nesting >= MAX_DEPTH {
            return Err(DslError::SyntaxError(format!("括号嵌套超过{MAX_DEPTH}层")));
        }

        self.nesting += 1;
        let (inner, inner_depth) = self.parse_expr()?;
        self.nesting -= 1;

        match self.cursor.next() {
            Ok(token) if token.kind() == TokenKind::RightBracket => {
                Ok((Expr::Group(Box::new(inner)), check_depth(inner_depth + 1)?))
            }
            Ok(token) => Err(DslError::SyntaxError(format!(
                "括号未闭合：期望 `)`，实际为 {token}"
            ))),
            Err(_) => Err(DslError::SyntaxError("括号未闭合：缺少 `)`".to_string())),
        }
    }

    fn parse_number_compare(&mut self, field: NumField, keyword: &Token) -> DslResult<Expr> {
        let op_token = self.expect_next(|| format!("`{keyword}` 之后缺少操作符"))?;
        let op = match op_token.kind() {
            TokenKind::FullEqual => NumOp::Eq,
            TokenKind::NotEqual => NumOp::Ne,
            TokenKind::Gt => NumOp::Gt,
            TokenKind::Gte => NumOp::Gte,
            TokenKind::Lt => NumOp::Lt,
            TokenKind::Lte => NumOp::Lte,
            _ => {
                return Err(DslError::SyntaxError(format!(
                    "数值字段不支持该操作符：`{keyword} {op_token}`"
                )));
            }
        };

        let value_token = self.expect_next(|| format!("`{keyword} {op_token}` 之后缺少数字"))?;
        match (value_token.kind(), value_token.numeric_value()) {
            (TokenKind::Number, Some(value)) => Ok(Expr::Number(NumberMatch::new(field, op, value))),
            _ => Err(DslError::SyntaxError(format!(
                "数值字段右值必须是数字：`{keyword} {op_token} {value_token}`"
            ))),
        }
    }

    fn parse_string_compare(&mut self, field: StrField, keyword: &Token) -> DslResult<Expr> {
        let op_token = self.expect_next(|| format!("`{keyword}` 之后缺少操作符"))?;
        if !matches!(
            op_token.kind(),
            TokenKind::Contains | TokenKind::FullEqual | TokenKind::NotEqual | TokenKind::RegexEqual
        ) {
            return Err(DslError::SyntaxError(format!(
                "文本字段不支持该操作符：`{keyword} {op_token}`"
            )));
        }

        let text_token = self.expect_next(|| format!("`{keyword} {op_token}` 之后缺少文本"))?;
        if text_token.kind() != TokenKind::Text {
            return Err(DslError::SyntaxError(format!(
                "文本字段右值必须是引号文本：`{keyword} {op_token} {text_token}`"
            )));
        }

        let literal = text_token.literal();
        let op = match op_token.kind() {
            TokenKind::Contains => StrOp::Contains,
            TokenKind::FullEqual => StrOp::Equals,
            TokenKind::NotEqual => StrOp::NotContains,
            // 正则在解析期编译一次，之后所有求值复用
            _ => StrOp::Regex(Regex::new(literal)?),
        };

        Ok(Expr::String(StringMatch::new(field, op, literal)))
    }

    /// 读取下一个token；规则提前结束视为语法错误
    fn expect_next(&mut self, context: impl FnOnce() -> String) -> DslResult<Token> {
        match self.cursor.next() {
            Ok(token) => Ok(token.clone()),
            Err(DslError::ExhaustedTokens(_)) => Err(DslError::SyntaxError(format!(
                "规则意外结束：{}",
                context()
            ))),
            Err(e) => Err(e),
        }
    }
}
