// 网关回调数据模型
// 定义回调字段集合、授权事件及验签结果

use std::collections::BTreeMap;
use rust_decimal::Decimal;
use serde::Serialize;
use crate::error::GatewayError;

/// 回调字段名
pub mod callback_field {
    pub const SIGNATURE: &str = "signature";
    pub const RESPONSE_CODE: &str = "responseCode";
    pub const ORDER_REF: &str = "orderRef";
    pub const XREF: &str = "xref";
    /// 网关回传的金额字段 (拼写与网关一致)
    pub const AMMOUNT: &str = "ammount";
    pub const AMOUNT: &str = "amount";
}

/// 渠道标识所在的查询参数
pub const CHANNEL_PARAM: &str = "rmtpay";

/// 网关支付方式标签
pub const PAYMETHOD_LABEL: &str = "Charity Clear";

/// 网关模块名
pub const GATEWAY_MODULE: &str = "CharityClear";

/// 一次网关回调
#[derive(Debug, Clone, Default)]
pub struct IncomingCallback {
    /// `rmtpay` 查询参数
    pub channel: Option<String>,
    /// 回调字段 (含签名)
    pub fields: BTreeMap<String, String>,
}

impl IncomingCallback {
    pub fn new(channel: Option<String>, fields: BTreeMap<String, String>) -> Self {
        Self { channel, fields }
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn order_ref(&self) -> Option<&str> {
        self.field(callback_field::ORDER_REF)
    }
}

/// 订单授权事件
///
/// 验签、响应码、订单解析全部通过后才会生成，交由订单系统落地。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorizedEvent {
    pub order_id: u64,
    /// 网关交易号 (xref)
    pub transaction_id: String,
    /// 授权金额 (主货币单位)
    pub amount: Decimal,
    pub gateway: String,
    pub paymethod: String,
    pub capture: bool,
}

/// 回调处理结果
#[derive(Debug, Clone, PartialEq)]
pub enum CallbackOutcome {
    /// 不属于本渠道的回调，不做任何处理
    Ignored,
    /// 授权通过
    Authorized(AuthorizedEvent),
    /// 拒绝，订单状态不变
    Rejected(GatewayError),
}

/// 回调的HTTP响应描述
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackResponse {
    /// 不属于本处理器，不发出重定向
    Ignored,
    /// 重定向到感谢页
    Thanks { location: String },
    /// 带错误消息重定向回结账页
    Checkout { location: String, message: String },
}

impl CallbackResponse {
    pub fn location(&self) -> Option<&str> {
        match self {
            CallbackResponse::Ignored => None,
            CallbackResponse::Thanks { location } => Some(location),
            CallbackResponse::Checkout { location, .. } => Some(location),
        }
    }
}
