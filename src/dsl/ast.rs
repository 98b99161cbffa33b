//! 语法树节点定义与求值
//! 节点种类封闭：字符串匹配、数值匹配、逻辑组合、括号分组
//! 字段与操作符按值类型拆分，解析器无法构造出非法节点，求值因此是全函数

use std::fmt::{self, Display, Formatter, Write};

use regex::Regex;

use crate::dsl::trace::EvalTracer;
use crate::observation::Observation;

/// 文本字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrField {
    Body,
    Header,
}

impl StrField {
    pub fn as_str(self) -> &'static str {
        match self {
            StrField::Body => "body",
            StrField::Header => "header",
        }
    }

    fn read(self, obs: &Observation) -> &str {
        match self {
            StrField::Body => &obs.body,
            StrField::Header => &obs.header,
        }
    }
}

/// 数值字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumField {
    Status,
    Icon,
}

impl NumField {
    pub fn as_str(self) -> &'static str {
        match self {
            NumField::Status => "status",
            NumField::Icon => "icon",
        }
    }

    fn read(self, obs: &Observation) -> i64 {
        match self {
            NumField::Status => obs.status,
            NumField::Icon => i64::from(obs.icon),
        }
    }
}

/// 文本操作符，正则变体独占其预编译模式
#[derive(Debug, Clone)]
pub enum StrOp {
    /// `=`
    Contains,
    /// `==`
    Equals,
    /// `!=`
    NotContains,
    /// `~=`
    Regex(Regex),
}

impl StrOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            StrOp::Contains => "=",
            StrOp::Equals => "==",
            StrOp::NotContains => "!=",
            StrOp::Regex(_) => "~=",
        }
    }
}

/// 数值操作符
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl NumOp {
    pub fn symbol(self) -> &'static str {
        match self {
            NumOp::Eq => "==",
            NumOp::Ne => "!=",
            NumOp::Gt => ">",
            NumOp::Gte => ">=",
            NumOp::Lt => "<",
            NumOp::Lte => "<=",
        }
    }

    /// 观测值在左、字面量在右
    fn apply(self, observed: i64, literal: i64) -> bool {
        match self {
            NumOp::Eq => observed == literal,
            NumOp::Ne => observed != literal,
            NumOp::Gt => observed > literal,
            NumOp::Gte => observed >= literal,
            NumOp::Lt => observed < literal,
            NumOp::Lte => observed <= literal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicOp {
    And,
    Or,
}

impl LogicOp {
    pub fn symbol(self) -> &'static str {
        match self {
            LogicOp::And => "&&",
            LogicOp::Or => "||",
        }
    }
}

/// 文本匹配：`body`/`header` 与引号文本比较
#[derive(Debug, Clone)]
pub struct StringMatch {
    field: StrField,
    op: StrOp,
    literal: String,
    // 预先转小写的字面量
    folded: String,
}

impl StringMatch {
    pub fn new(field: StrField, op: StrOp, literal: impl Into<String>) -> Self {
        let literal = literal.into();
        let folded = literal.to_lowercase();
        Self {
            field,
            op,
            literal,
            folded,
        }
    }

    pub fn field(&self) -> StrField {
        self.field
    }

    pub fn op(&self) -> &StrOp {
        &self.op
    }

    pub fn literal(&self) -> &str {
        &self.literal
    }

    fn matches(&self, obs: &Observation) -> bool {
        let value = self.field.read(obs);
        match &self.op {
            // 正则不做大小写折叠，由模式自身决定
            StrOp::Regex(re) => re.is_match(value),
            StrOp::Equals => value.to_lowercase() == self.folded,
            StrOp::Contains => value.to_lowercase().contains(&self.folded),
            StrOp::NotContains => !value.to_lowercase().contains(&self.folded),
        }
    }
}

impl Display for StringMatch {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.op {
            StrOp::Regex(re) => write!(f, "{} ~= regex('{}')", self.field.as_str(), re.as_str()),
            op => write!(f, "{} {} {:?}", self.field.as_str(), op.symbol(), self.literal),
        }
    }
}

/// 数值匹配：`status`/`icon` 与整数比较
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberMatch {
    field: NumField,
    op: NumOp,
    literal: i64,
}

impl NumberMatch {
    pub fn new(field: NumField, op: NumOp, literal: i64) -> Self {
        Self { field, op, literal }
    }

    pub fn field(&self) -> NumField {
        self.field
    }

    pub fn op(&self) -> NumOp {
        self.op
    }

    pub fn literal(&self) -> i64 {
        self.literal
    }

    fn matches(&self, obs: &Observation) -> bool {
        self.op.apply(self.field.read(obs), self.literal)
    }
}

impl Display for NumberMatch {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field.as_str(), self.op.symbol(), self.literal)
    }
}

/// 逻辑组合
#[derive(Debug, Clone)]
pub struct LogicExpr {
    op: LogicOp,
    left: Box<Expr>,
    right: Box<Expr>,
}

impl LogicExpr {
    pub fn new(op: LogicOp, left: Expr, right: Expr) -> Self {
        Self {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn op(&self) -> LogicOp {
        self.op
    }

    pub fn left(&self) -> &Expr {
        &self.left
    }

    pub fn right(&self) -> &Expr {
        &self.right
    }

    fn evaluate(&self, obs: &Observation, tracer: &mut dyn EvalTracer) -> bool {
        let left = self.left.evaluate(obs, tracer);
        // 左值已能决定结果时短路
        let decided = match self.op {
            LogicOp::And => !left,
            LogicOp::Or => left,
        };
        tracer.on_logic(self, left, decided);
        if decided {
            return left;
        }
        self.right.evaluate(obs, tracer)
    }
}

impl Display for LogicExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.op.symbol(), self.right)
    }
}

/// 语法树节点
#[derive(Debug, Clone)]
pub enum Expr {
    String(StringMatch),
    Number(NumberMatch),
    Logic(LogicExpr),
    /// 括号表达式，保留为独立节点（影响解析时的操作数顺序）
    Group(Box<Expr>),
}

impl Expr {
    pub fn is_group(&self) -> bool {
        matches!(self, Expr::Group(_))
    }

    /// 对观测记录求值
    pub fn evaluate(&self, obs: &Observation, tracer: &mut dyn EvalTracer) -> bool {
        match self {
            Expr::String(m) => {
                let matched = m.matches(obs);
                tracer.on_match(self, matched);
                matched
            }
            Expr::Number(m) => {
                let matched = m.matches(obs);
                tracer.on_match(self, matched);
                matched
            }
            Expr::Logic(logic) => logic.evaluate(obs, tracer),
            Expr::Group(inner) => inner.evaluate(obs, tracer),
        }
    }

    /// 节点总数
    pub fn node_count(&self) -> usize {
        match self {
            Expr::String(_) | Expr::Number(_) => 1,
            Expr::Logic(logic) => 1 + logic.left.node_count() + logic.right.node_count(),
            Expr::Group(inner) => 1 + inner.node_count(),
        }
    }

    /// 缩进树形渲染，仅用于调试
    pub fn write_tree(&self, out: &mut String, level: usize) -> fmt::Result {
        let indent = "  ".repeat(level);
        match self {
            Expr::String(m) => writeln!(out, "{indent}match: {m}"),
            Expr::Number(m) => writeln!(out, "{indent}match: {m}"),
            Expr::Logic(logic) => {
                writeln!(out, "{indent}logic: {}", logic.op.symbol())?;
                writeln!(out, "{indent}  - left:")?;
                logic.left.write_tree(out, level + 2)?;
                writeln!(out, "{indent}  - right:")?;
                logic.right.write_tree(out, level + 2)
            }
            Expr::Group(inner) => {
                writeln!(out, "{indent}group:")?;
                inner.write_tree(out, level + 1)
            }
        }
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expr::String(m) => Display::fmt(m, f),
            Expr::Number(m) => Display::fmt(m, f),
            Expr::Logic(logic) => Display::fmt(logic, f),
            Expr::Group(inner) => write!(f, "({inner})"),
        }
    }
}
