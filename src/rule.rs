//! 规则门面：编译一次，多次（可并发）求值

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use tracing::debug;

use crate::config::{ConfigManager, DslConfig};
use crate::dsl::ast::Expr;
use crate::dsl::cursor::TokenCursor;
use crate::dsl::parser::Parser;
use crate::dsl::trace::{EvalTracer, LogTracer, NoopTracer};
use crate::error::{DslError, DslResult};
use crate::observation::Observation;

/// 编译后的指纹规则，构建后不可变
#[derive(Debug, Clone, Default)]
pub struct Rule {
    source: String,
    root: Option<Expr>,
    trace: bool,
}

impl Rule {
    /// 使用默认配置编译
    pub fn compile(source: &str) -> DslResult<Self> {
        Self::compile_with(source, ConfigManager::get_default())
    }

    /// 使用自定义配置编译（关键字列表、诊断开关）
    pub fn compile_with(source: &str, config: &DslConfig) -> DslResult<Self> {
        let cursor = TokenCursor::from_source(source, config)?;
        let root = Parser::new(cursor).parse()?;
        debug!("规则编译完成：{}", source);
        Ok(Self {
            source: source.to_string(),
            root,
            trace: config.trace,
        })
    }

    /// 无根节点的空规则，恒为 false
    pub fn empty() -> Self {
        Self::default()
    }

    /// 求值；配置开启诊断时输出求值日志
    pub fn evaluate(&self, obs: &Observation) -> bool {
        if self.trace {
            self.evaluate_traced(obs, &mut LogTracer)
        } else {
            self.evaluate_traced(obs, &mut NoopTracer)
        }
    }

    /// 带自定义观察者求值
    pub fn evaluate_traced(&self, obs: &Observation, tracer: &mut dyn EvalTracer) -> bool {
        match &self.root {
            Some(root) => root.evaluate(obs, tracer),
            None => false,
        }
    }

    /// 缩进树形结构，仅供调试，不保证可重新编译
    pub fn describe(&self) -> String {
        let mut out = String::new();
        if let Some(root) = &self.root {
            // 写入String不会失败
            let _ = root.write_tree(&mut out, 0);
        }
        out
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> Option<&Expr> {
        self.root.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }
}

impl Display for Rule {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl FromStr for Rule {
    type Err = DslError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::compile(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::trace::RecordingTracer;
    use crate::error::ErrorKind;

    fn nginx_observation() -> Observation {
        Observation::new()
            .status(200)
            .header("Server: Nginx")
            .body("<h1>hello nginx!<h1>")
            .icon(123)
    }

    #[test]
    fn test_compile_and_evaluate() {
        let rule = Rule::compile(r#"status==200 && (header="nginx" || body="nginx")"#).unwrap();
        assert!(rule.evaluate(&nginx_observation()));
        assert!(!rule.evaluate(&Observation::new().status(200).header("Server: apache")));
    }

    #[test]
    fn test_empty_rule_is_false() {
        assert!(!Rule::empty().evaluate(&nginx_observation()));
        let rule = Rule::compile("").unwrap();
        assert!(rule.is_empty());
        assert!(!rule.evaluate(&nginx_observation()));
        assert_eq!(rule.describe(), "");
    }

    #[test]
    fn test_describe_tree() {
        let rule = Rule::compile(r#"status==200 && (header="x" || body~="y+")"#).unwrap();
        let tree = rule.describe();
        let expected = "\
logic: &&
  - left:
    group:
      logic: ||
        - left:
          match: header = \"x\"
        - right:
          match: body ~= regex('y+')
  - right:
    match: status == 200
";
        assert_eq!(tree, expected);
    }

    #[test]
    fn test_from_str_and_display() {
        let rule: Rule = "icon==123".parse().unwrap();
        assert_eq!(rule.to_string(), "icon==123");
        assert_eq!(rule.source(), "icon==123");
        assert!(rule.root().is_some());

        let err = "icon=123".parse::<Rule>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SyntaxError);
    }

    #[test]
    fn test_trace_flag_keeps_result() {
        let config = ConfigManager::custom().trace(true).build();
        let rule = Rule::compile_with("status>=200 && status<300", &config).unwrap();
        assert!(rule.evaluate(&nginx_observation()));
    }

    #[test]
    fn test_evaluate_traced() {
        let rule = Rule::compile(r#"header="apache" || icon==123"#).unwrap();
        let mut tracer = RecordingTracer::default();
        assert!(rule.evaluate_traced(&nginx_observation(), &mut tracer));
        assert_eq!(tracer.matched_nodes(), vec![r#"header = "apache""#, "icon == 123"]);
    }

    #[test]
    fn test_rule_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Rule>();
    }
}
