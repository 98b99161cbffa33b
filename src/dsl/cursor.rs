//! token游标：单向前进，可回退一步，供解析器实现单token前瞻

use crate::config::DslConfig;
use crate::dsl::token::{tokenize_with_keywords, Token};
use crate::error::{DslError, DslResult};

#[derive(Debug, Clone)]
pub struct TokenCursor {
    tokens: Vec<Token>,
    index: usize,
}

impl TokenCursor {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, index: 0 }
    }

    /// 词法分析后直接构建游标
    pub fn from_source(source: &str, config: &DslConfig) -> DslResult<Self> {
        Ok(Self::new(tokenize_with_keywords(source, &config.keywords)?))
    }

    /// 返回当前位置的token并前进
    pub fn next(&mut self) -> DslResult<&Token> {
        let token = self
            .tokens
            .get(self.index)
            .ok_or(DslError::ExhaustedTokens(self.index))?;
        self.index += 1;
        Ok(token)
    }

    /// 回退一步（解析器不会连续回退）
    pub fn rewind(&mut self) {
        self.index = self.index.saturating_sub(1);
    }

    pub fn has_next(&self) -> bool {
        self.index < self.tokens.len()
    }

    pub fn position(&self) -> usize {
        self.index
    }

    /// 尚未读取的token
    pub fn remaining(&self) -> &[Token] {
        self.tokens.get(self.index..).unwrap_or(&[])
    }
}
