// 配置管理模块
// 负责加载和管理应用程序配置

use serde::{Deserialize, Serialize};
use std::env;
use anyhow::{Result, Context};
use crate::error::GatewayError;
use crate::utils::InputValidator;

/// CharityClear 在线托管支付页
pub const LIVE_URL: &str = "https://gateway.charityclear.com/paymentform/";

/// 测试模式下使用的商户号
pub const SANDBOX_MERCHANT_ID: u64 = 100003;

/// 默认的回调渠道标识 (rmtpay 查询参数)
pub const DEFAULT_MODULE_ID: &str = "charityclear";

/// 应用程序配置结构
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// 服务器配置
    pub server: ServerConfig,
    /// 网关配置
    pub gateway: GatewayConfig,
    /// 商店页面配置
    pub shop: ShopConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 服务器监听地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
    /// 工作线程数
    pub workers: Option<usize>,
    /// 对外访问的基础URL (用于拼接回调地址)
    pub public_base_url: String,
    /// 允许跨域的源，为空时只允许本地开发源
    pub allowed_origins: Vec<String>,
}

/// CharityClear 网关配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// 正式商户号
    pub merchant_id: Option<u64>,
    /// 签名密钥 (不在任何响应中返回)
    #[serde(skip_serializing)]
    pub secret_key: String,
    /// 是否启用测试模式
    pub test_mode: bool,
    /// 回调是否必须携带签名
    pub require_signature: bool,
    /// 回调渠道标识
    pub module_id: String,
    /// 正式环境支付页
    pub gateway_url: String,
    /// 测试环境支付页
    pub sandbox_url: String,
    /// 显式指定的回调地址，未设置时由 public_base_url 推导
    pub return_url: Option<String>,
}

/// 商店页面配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopConfig {
    /// 支付成功后的感谢页
    pub thanks_url: String,
    /// 支付失败后返回的结账页
    pub checkout_url: String,
}

impl GatewayConfig {
    /// 根据测试模式选择商户号
    pub fn effective_merchant_id(&self) -> std::result::Result<u64, GatewayError> {
        if self.test_mode {
            return Ok(SANDBOX_MERCHANT_ID);
        }
        self.merchant_id.ok_or(GatewayError::MissingMerchantId)
    }

    /// 表单提交的目标地址
    pub fn form_action_url(&self) -> &str {
        if self.test_mode {
            &self.sandbox_url
        } else {
            &self.gateway_url
        }
    }
}

impl ShopConfig {
    /// 带错误消息的结账页重定向地址
    pub fn checkout_redirect(&self, message: &str) -> String {
        let separator = if self.checkout_url.contains('?') { '&' } else { '?' };
        format!(
            "{}{}error={}",
            self.checkout_url,
            separator,
            crate::utils::php_urlencode(message)
        )
    }
}

impl Config {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok(); // 加载.env文件，忽略错误

        let host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .context("Invalid SERVER_PORT")?;
        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{}", port));

        Ok(Config {
            server: ServerConfig {
                host,
                port,
                workers: env::var("SERVER_WORKERS")
                    .ok()
                    .and_then(|s| s.parse().ok()),
                public_base_url: public_base_url.clone(),
                allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                    .map(|s| {
                        s.split(',')
                            .map(|o| o.trim().to_string())
                            .filter(|o| !o.is_empty())
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            gateway: GatewayConfig {
                merchant_id: match env::var("CHARITYCLEAR_MERCHANT_ID") {
                    Ok(id) => Some(id.trim().parse().context("Invalid CHARITYCLEAR_MERCHANT_ID")?),
                    Err(_) => None,
                },
                secret_key: env::var("CHARITYCLEAR_SECRET")
                    .context("CHARITYCLEAR_SECRET environment variable is required")?,
                test_mode: parse_flag("CHARITYCLEAR_TEST_MODE", false)?,
                require_signature: parse_flag("CHARITYCLEAR_REQUIRE_SIGNATURE", true)?,
                module_id: env::var("CHARITYCLEAR_MODULE_ID")
                    .unwrap_or_else(|_| DEFAULT_MODULE_ID.to_string()),
                gateway_url: env::var("CHARITYCLEAR_GATEWAY_URL")
                    .unwrap_or_else(|_| LIVE_URL.to_string()),
                sandbox_url: env::var("CHARITYCLEAR_SANDBOX_URL")
                    .unwrap_or_else(|_| LIVE_URL.to_string()),
                return_url: env::var("CHARITYCLEAR_RETURN_URL").ok(),
            },
            shop: ShopConfig {
                thanks_url: env::var("SHOP_THANKS_URL")
                    .unwrap_or_else(|_| format!("{}/thanks", public_base_url)),
                checkout_url: env::var("SHOP_CHECKOUT_URL")
                    .unwrap_or_else(|_| format!("{}/checkout", public_base_url)),
            },
        })
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port cannot be 0");
        }

        let mut validator = InputValidator::new();
        validator.validate_required("CHARITYCLEAR_SECRET", &self.gateway.secret_key);
        validator.validate_required("CHARITYCLEAR_MODULE_ID", &self.gateway.module_id);
        if !self.gateway.test_mode && self.gateway.merchant_id.is_none() {
            validator.add_error("CHARITYCLEAR_MERCHANT_ID", "Required unless test mode is enabled");
        }
        validator.validate_url_field("CHARITYCLEAR_GATEWAY_URL", &self.gateway.gateway_url);
        validator.validate_url_field("CHARITYCLEAR_SANDBOX_URL", &self.gateway.sandbox_url);
        validator.validate_url_field("SHOP_THANKS_URL", &self.shop.thanks_url);
        validator.validate_url_field("SHOP_CHECKOUT_URL", &self.shop.checkout_url);
        validator.validate_url_field("PUBLIC_BASE_URL", &self.server.public_base_url);
        if let Some(url) = &self.gateway.return_url {
            validator.validate_url_field("CHARITYCLEAR_RETURN_URL", url);
        }

        validator.into_result()
    }

    /// 获取服务器绑定地址
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// 网关回调地址 (即签名字段中的 redirectURL)
    pub fn callback_url(&self) -> String {
        match &self.gateway.return_url {
            Some(url) => url.clone(),
            None => format!(
                "{}/callback?rmtpay={}",
                self.server.public_base_url.trim_end_matches('/'),
                crate::utils::php_urlencode(&self.gateway.module_id)
            ),
        }
    }
}

/// 解析布尔开关，接受 1/0、true/false、yes/no、on/off
fn parse_flag(name: &str, default: bool) -> Result<bool> {
    match env::var(name) {
        Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" | "" => Ok(false),
            other => anyhow::bail!("Invalid {}: {}", name, other),
        },
        Err(_) => Ok(default),
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                workers: None,
                public_base_url: "http://localhost:8080".to_string(),
                allowed_origins: Vec::new(),
            },
            gateway: GatewayConfig {
                merchant_id: None,
                secret_key: "".to_string(),
                test_mode: true,
                require_signature: true,
                module_id: DEFAULT_MODULE_ID.to_string(),
                gateway_url: LIVE_URL.to_string(),
                sandbox_url: LIVE_URL.to_string(),
                return_url: None,
            },
            shop: ShopConfig {
                thanks_url: "http://localhost:8080/thanks".to_string(),
                checkout_url: "http://localhost:8080/checkout".to_string(),
            },
        }
    }
}
