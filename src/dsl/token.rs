//! 词法分析：将规则文本切分为有序的token序列
//! 支持引号文本（`\X` 转义）、比较/逻辑操作符、括号、数字以及字段关键字

use std::fmt::{self, Display, Formatter};

use crate::config::DEFAULT_KEYWORDS;
use crate::error::{DslError, DslResult};

/// token类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// 字段关键字（status/body/header/icon 或自定义关键字）
    Keyword,
    /// 引号文本
    Text,
    /// 十进制整数
    Number,

    /// `=` 包含
    Contains,
    /// `==` 完全相等
    FullEqual,
    /// `!=` 不等 / 不包含
    NotEqual,
    /// `~=` 正则匹配
    RegexEqual,

    /// `&&`
    And,
    /// `||`
    Or,

    Gt,
    Gte,
    Lt,
    Lte,

    LeftBracket,
    RightBracket,
}

impl TokenKind {
    /// 逻辑连接符
    pub fn is_logic(self) -> bool {
        matches!(self, TokenKind::And | TokenKind::Or)
    }
}

/// 操作符表，两字符操作符必须排在其单字符前缀之前
const OPERATORS: [(&str, TokenKind); 10] = [
    ("==", TokenKind::FullEqual),
    ("=", TokenKind::Contains),
    ("~=", TokenKind::RegexEqual),
    ("!=", TokenKind::NotEqual),
    ("||", TokenKind::Or),
    ("&&", TokenKind::And),
    (">=", TokenKind::Gte),
    ("<=", TokenKind::Lte),
    (">", TokenKind::Gt),
    ("<", TokenKind::Lt),
];

/// 词法单元，生成后不可变
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    kind: TokenKind,
    literal: String,
    number: Option<i64>,
}

impl Token {
    fn new(kind: TokenKind, literal: impl Into<String>) -> Self {
        Self {
            kind,
            literal: literal.into(),
            number: None,
        }
    }

    fn number(literal: &str, value: i64) -> Self {
        Self {
            kind: TokenKind::Number,
            literal: literal.to_string(),
            number: Some(value),
        }
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// 源文本（引号文本为去转义后的内容）
    pub fn literal(&self) -> &str {
        &self.literal
    }

    /// 仅数字token有值
    pub fn numeric_value(&self) -> Option<i64> {
        self.number
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Text => write!(f, "\"{}\"", self.literal),
            _ => f.write_str(&self.literal),
        }
    }
}

/// 使用默认关键字列表切分规则
pub fn tokenize(source: &str) -> DslResult<Vec<Token>> {
    tokenize_with_keywords(source, &DEFAULT_KEYWORDS)
}

/// 使用调用方提供的关键字列表切分规则
///
/// 扫描是完全的：要么消费全部输入，要么返回第一个词法错误。
pub fn tokenize_with_keywords<S: AsRef<str>>(source: &str, keywords: &[S]) -> DslResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while let Some(ch) = source[pos..].chars().next() {
        let rest = &source[pos..];
        match ch {
            '"' => {
                let (token, consumed) = scan_text(rest)?;
                tokens.push(token);
                pos += consumed;
            }
            '=' | '~' | '!' | '|' | '&' | '>' | '<' => {
                let (token, consumed) = scan_operator(rest)?;
                tokens.push(token);
                pos += consumed;
            }
            '(' => {
                tokens.push(Token::new(TokenKind::LeftBracket, "("));
                pos += 1;
            }
            ')' => {
                tokens.push(Token::new(TokenKind::RightBracket, ")"));
                pos += 1;
            }
            c if c.is_ascii_digit() => {
                let (token, consumed) = scan_number(rest)?;
                tokens.push(token);
                pos += consumed;
            }
            ' ' | '\t' | '\r' | '\n' => pos += 1,
            _ => {
                let (token, consumed) = scan_keyword(rest, keywords)?;
                tokens.push(token);
                pos += consumed;
            }
        }
    }

    Ok(tokens)
}

/// 错误消息中原始文本的最大字符数
const ERROR_PREVIEW_CHARS: usize = 32;

/// 截断错误消息中的原始文本，超长时追加省略号
fn preview(rest: &str) -> String {
    let mut chars = rest.chars();
    let mut out: String = chars.by_ref().take(ERROR_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        out.push('…');
    }
    out
}

/// 解析引号文本，返回 (token, 消耗的字节数含两侧引号)
fn scan_text(rest: &str) -> DslResult<(Token, usize)> {
    let mut content = String::new();
    let mut chars = rest.char_indices().skip(1);

    while let Some((idx, ch)) = chars.next() {
        match ch {
            '\\' => match chars.next() {
                Some((_, escaped)) => content.push(escaped),
                None => break,
            },
            '"' => return Ok((Token::new(TokenKind::Text, content), idx + 1)),
            _ => content.push(ch),
        }
    }

    Err(DslError::UnterminatedText(preview(rest)))
}

fn scan_operator(rest: &str) -> DslResult<(Token, usize)> {
    OPERATORS
        .iter()
        .find(|(op, _)| rest.starts_with(op))
        .map(|(op, kind)| (Token::new(*kind, *op), op.len()))
        .ok_or_else(|| DslError::InvalidOperator(rest.chars().take(2).collect()))
}

fn scan_number(rest: &str) -> DslResult<(Token, usize)> {
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = &rest[..end];
    let value = digits
        .parse::<i64>()
        .map_err(|_| DslError::InvalidNumber(preview(digits)))?;
    Ok((Token::number(digits, value), end))
}

/// 最长前缀匹配关键字
fn scan_keyword<S: AsRef<str>>(rest: &str, keywords: &[S]) -> DslResult<(Token, usize)> {
    keywords
        .iter()
        .map(AsRef::as_ref)
        .filter(|kw| !kw.is_empty() && rest.starts_with(kw))
        .max_by_key(|kw| kw.len())
        .map(|kw| (Token::new(TokenKind::Keyword, kw), kw.len()))
        .ok_or_else(|| DslError::UnknownToken(preview(rest)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(Token::kind).collect()
    }

    #[test]
    fn test_tokenize_number_compare() {
        let tokens = tokenize("status==200 && icon==200").unwrap();
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Keyword,
                TokenKind::FullEqual,
                TokenKind::Number,
                TokenKind::And,
                TokenKind::Keyword,
                TokenKind::FullEqual,
                TokenKind::Number,
            ]
        );
        assert_eq!(tokens[0].literal(), "status");
        assert_eq!(tokens[2].numeric_value(), Some(200));
        assert_eq!(tokens[1].numeric_value(), None);
    }

    #[test]
    fn test_tokenize_escaped_quotes() {
        let source = r#"body="href=\"http://www.thinkphp.cn\">thinkphp</a>" || body="thinkphp_show_page_trace""#;
        let tokens = tokenize(source).unwrap();
        assert_eq!(tokens.len(), 7);
        assert_eq!(tokens[2].kind(), TokenKind::Text);
        assert_eq!(tokens[2].literal(), r#"href="http://www.thinkphp.cn">thinkphp</a>"#);
        assert_eq!(tokens[6].literal(), "thinkphp_show_page_trace");
    }

    #[test]
    fn test_tokenize_regex_text_keeps_escaped_char_only() {
        // `\d` 转义只保留后一个字符
        let tokens = tokenize(r#"body~="EZCMS ([\d\.]+)""#).unwrap();
        assert_eq!(tokens[1].kind(), TokenKind::RegexEqual);
        assert_eq!(tokens[2].literal(), "EZCMS ([d.]+)");
    }

    #[test]
    fn test_operator_longest_prefix() {
        let tokens = tokenize("icon>=1 icon>1 icon<=1 icon<1 body!=\"a\" body=\"a\"").unwrap();
        let ops: Vec<TokenKind> = tokens.iter().skip(1).step_by(3).map(Token::kind).collect();
        assert_eq!(
            ops,
            vec![
                TokenKind::Gte,
                TokenKind::Gt,
                TokenKind::Lte,
                TokenKind::Lt,
                TokenKind::NotEqual,
                TokenKind::Contains,
            ]
        );
    }

    #[test]
    fn test_whitespace_and_brackets() {
        let tokens = tokenize("\t( status==1 )\r\n").unwrap();
        assert_eq!(tokens.first().map(Token::kind), Some(TokenKind::LeftBracket));
        assert_eq!(tokens.last().map(Token::kind), Some(TokenKind::RightBracket));
        assert_eq!(tokens.len(), 5);
    }

    #[test]
    fn test_unterminated_text() {
        let err = tokenize(r#"body="abc"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnterminatedText);

        let err = tokenize(r#"body="abc\"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnterminatedText);
    }

    #[test]
    fn test_invalid_operator() {
        let err = tokenize("status ! 200").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOperator);
        assert!(tokenize("body ~ \"x\"").is_err());
        assert!(tokenize("status | status").is_err());
    }

    #[test]
    fn test_unknown_token() {
        let err = tokenize("title=\"abc\"").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownToken);
        assert!(err.to_string().contains("title"));
    }

    #[test]
    fn test_error_text_truncated() {
        let huge = "x".repeat(1 << 20);

        let err = tokenize(&format!("status==1 && {huge}")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownToken);
        let message = err.to_string();
        assert!(message.chars().count() < 64, "{message}");
        assert!(message.ends_with('…'));

        let err = tokenize(&format!("body=\"{huge}")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnterminatedText);
        assert!(err.to_string().chars().count() < 64);

        let err = tokenize(&format!("status=={}", "9".repeat(1 << 16))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidNumber);
        assert!(err.to_string().chars().count() < 64);

        // 短文本原样保留
        assert_eq!(preview("title"), "title");
        assert_eq!(preview(&"a".repeat(ERROR_PREVIEW_CHARS)), "a".repeat(ERROR_PREVIEW_CHARS));
    }

    #[test]
    fn test_number_overflow() {
        let err = tokenize("status==99999999999999999999").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidNumber);
        assert!(err.is_lex_error());
    }

    #[test]
    fn test_custom_keywords_longest_match() {
        let tokens = tokenize_with_keywords("title_full=\"x\"", &["title", "title_full"]).unwrap();
        assert_eq!(tokens[0].literal(), "title_full");
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn test_multibyte_text() {
        let tokens = tokenize("body=\"你好 nginx\"").unwrap();
        assert_eq!(tokens[2].literal(), "你好 nginx");
    }

    #[test]
    fn test_empty_source() {
        assert!(tokenize("  \n ").unwrap().is_empty());
    }
}
