//! 配置解析模块
//!
//! 支持 TOML (主要) 和 JSON (可选) 格式。解析错误带有出错行号。

use contracts::{ContractError, NotifyBlueprint};

/// 配置文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML 格式 (推荐)
    Toml,
    /// JSON 格式
    Json,
}

impl ConfigFormat {
    /// 从文件扩展名推断格式
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Toml => "TOML",
            Self::Json => "JSON",
        }
    }
}

/// 解析 TOML 格式配置
pub fn parse_toml(content: &str) -> Result<NotifyBlueprint, ContractError> {
    toml::from_str(content).map_err(|e| {
        let line = e.span().map(|span| line_of(content, span.start));
        parse_error(ConfigFormat::Toml, line, e)
    })
}

/// 解析 JSON 格式配置
pub fn parse_json(content: &str) -> Result<NotifyBlueprint, ContractError> {
    serde_json::from_str(content).map_err(|e| {
        // serde_json 对数据错误(非语法)同样给出行号，0 表示未知
        let line = (e.line() > 0).then_some(e.line());
        parse_error(ConfigFormat::Json, line, e)
    })
}

/// 根据格式解析配置
pub fn parse(content: &str, format: ConfigFormat) -> Result<NotifyBlueprint, ContractError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

fn parse_error<E>(format: ConfigFormat, line: Option<usize>, err: E) -> ContractError
where
    E: std::error::Error + Send + Sync + 'static,
{
    let first_line = err.to_string().lines().next().unwrap_or_default().to_string();
    let message = match line {
        Some(line) => format!("{} parse error at line {line}: {first_line}", format.as_str()),
        None => format!("{} parse error: {first_line}", format.as_str()),
    };
    ContractError::ConfigParse {
        message,
        source: Some(Box::new(err)),
    }
}

/// 字节偏移 -> 1 起始行号
fn line_of(content: &str, offset: usize) -> usize {
    let end = offset.min(content.len());
    content.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() + 1
}
