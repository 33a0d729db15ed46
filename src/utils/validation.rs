// 数据验证工具函数
// 提供配置项与回调字段的格式检查

use std::collections::BTreeMap;
use std::sync::OnceLock;
use regex::Regex;
use anyhow::Result;

/// 验证URL格式 (仅允许 http/https)
///
/// # Arguments
/// * `url` - URL字符串
///
/// # Returns
/// * URL是否有效
pub fn validate_url(url: &str) -> bool {
    static URL_PATTERN: OnceLock<Regex> = OnceLock::new();
    URL_PATTERN
        .get_or_init(|| Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").expect("url pattern is valid"))
        .is_match(url)
}

/// 回调中订单号的解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderRef {
    /// 未提供 (缺失、空串或 `"0"`)
    Missing,
    /// 提供了但不是合法的订单号
    Invalid(String),
    /// 订单号
    Id(u64),
}

/// 解析回调中的订单号
pub fn parse_order_ref(raw: Option<&str>) -> OrderRef {
    match raw.map(str::trim) {
        None | Some("") | Some("0") => OrderRef::Missing,
        Some(value) => value
            .parse::<u64>()
            .map(OrderRef::Id)
            .unwrap_or_else(|_| OrderRef::Invalid(value.to_string())),
    }
}

/// 配置与输入验证器，收集所有字段错误后统一返回
pub struct InputValidator {
    errors: BTreeMap<String, Vec<String>>,
}

impl InputValidator {
    /// 创建新的验证器
    pub fn new() -> Self {
        Self {
            errors: BTreeMap::new(),
        }
    }

    /// 添加字段验证错误
    pub fn add_error(&mut self, field: &str, message: &str) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.to_string());
    }

    /// 验证必填字段
    pub fn validate_required(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.add_error(field, "This field is required");
        }
    }

    /// 验证URL格式
    pub fn validate_url_field(&mut self, field: &str, url: &str) {
        if !validate_url(url) {
            self.add_error(field, "Invalid URL format");
        }
    }

    /// 检查是否有验证错误
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// 转换为错误结果
    pub fn into_result(self) -> Result<()> {
        if self.has_errors() {
            let error_msg = self.errors
                .iter()
                .map(|(field, messages)| {
                    format!("{}: {}", field, messages.join(", "))
                })
                .collect::<Vec<_>>()
                .join("; ");

            anyhow::bail!("Validation failed: {}", error_msg);
        }

        Ok(())
    }
}

impl Default for InputValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://gateway.charityclear.com/paymentform/"));
        assert!(validate_url("http://localhost:8080/thanks"));

        assert!(!validate_url(""));
        assert!(!validate_url("ftp://example.com"));
        assert!(!validate_url("gateway.charityclear.com"));
    }

    #[test]
    fn test_parse_order_ref() {
        assert_eq!(parse_order_ref(None), OrderRef::Missing);
        assert_eq!(parse_order_ref(Some("")), OrderRef::Missing);
        assert_eq!(parse_order_ref(Some("0")), OrderRef::Missing);
        assert_eq!(parse_order_ref(Some(" 42 ")), OrderRef::Id(42));
        assert_eq!(parse_order_ref(Some("42abc")), OrderRef::Invalid("42abc".to_string()));
        assert_eq!(parse_order_ref(Some("-3")), OrderRef::Invalid("-3".to_string()));
    }

    #[test]
    fn test_input_validator() {
        let mut validator = InputValidator::new();

        validator.validate_required("secret", "  ");
        validator.validate_url_field("thanks", "not a url");
        validator.validate_url_field("checkout", "https://shop.example.com/checkout");

        assert!(validator.has_errors());
        let err = validator.into_result().unwrap_err().to_string();
        assert!(err.contains("secret: This field is required"));
        assert!(err.contains("thanks: Invalid URL format"));
        assert!(!err.contains("checkout"));
    }
}
