//! 求值诊断钩子
//! 每次叶子匹配与逻辑判断都会回调，仅用于观察，不影响求值结果

use tracing::debug;

use crate::dsl::ast::{Expr, LogicExpr};

/// 求值过程观察者
pub trait EvalTracer {
    /// 叶子节点（文本/数值匹配）求值完成
    fn on_match(&mut self, _node: &Expr, _matched: bool) {}

    /// 逻辑节点左侧求值完成，`short_circuit` 为真时右侧不再求值
    fn on_logic(&mut self, _node: &LogicExpr, _left: bool, _short_circuit: bool) {}
}

/// 不做任何事的观察者
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracer;

impl EvalTracer for NoopTracer {}

/// 以 `debug` 级别输出诊断日志
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTracer;

impl EvalTracer for LogTracer {
    fn on_match(&mut self, node: &Expr, matched: bool) {
        debug!(target: "fingerdsl::eval", "{}", match_line(node, matched));
    }

    fn on_logic(&mut self, node: &LogicExpr, left: bool, short_circuit: bool) {
        debug!(target: "fingerdsl::eval", "{}", logic_line(node, left, short_circuit));
    }
}

/// 单条求值事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    Match { node: String, matched: bool },
    Logic { op: &'static str, left: bool, short_circuit: bool },
}

/// 记录所有事件与诊断行
#[derive(Debug, Clone, Default)]
pub struct RecordingTracer {
    pub events: Vec<TraceEvent>,
    pub lines: Vec<String>,
}

impl RecordingTracer {
    /// 按求值顺序返回已求值的叶子节点文本
    pub fn matched_nodes(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|event| match event {
                TraceEvent::Match { node, .. } => Some(node.clone()),
                TraceEvent::Logic { .. } => None,
            })
            .collect()
    }
}

impl EvalTracer for RecordingTracer {
    fn on_match(&mut self, node: &Expr, matched: bool) {
        self.events.push(TraceEvent::Match {
            node: node.to_string(),
            matched,
        });
        self.lines.push(match_line(node, matched));
    }

    fn on_logic(&mut self, node: &LogicExpr, left: bool, short_circuit: bool) {
        self.events.push(TraceEvent::Logic {
            op: node.op().symbol(),
            left,
            short_circuit,
        });
        self.lines.push(logic_line(node, left, short_circuit));
    }
}

fn match_line(node: &Expr, matched: bool) -> String {
    format!("eval: {node} => {matched}")
}

fn logic_line(node: &LogicExpr, left: bool, short_circuit: bool) -> String {
    if short_circuit {
        format!("logic: {}, short-circuit, left: {}", node.op().symbol(), left)
    } else {
        format!("logic: {} {} {}", left, node.op().symbol(), node.right())
    }
}
