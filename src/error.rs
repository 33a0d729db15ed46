// 错误类型定义
// 网关签名/验签错误、订单存储错误、结账流程错误

use thiserror::Error;

/// 网关协议错误
///
/// 验签相关的四类错误都是终态错误: 向用户展示消息并重定向回结账页，不重试。
/// 其余变体是签名前的配置/输入校验失败。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// 回调签名不匹配 (或要求签名但缺失)
    #[error("The calculated signature of the payment return did not match, for security this order cant complete automatically please contact support.")]
    SignatureMismatch,

    /// 网关返回非零响应码
    #[error("There was a issue with that card, no payment has been taken, please retry")]
    GatewayDeclined {
        /// 网关原始响应码
        response_code: String,
    },

    /// 回调未携带订单号
    #[error("The order submitted by Charity Clear did not specify a transaction ID.")]
    MissingOrderReference,

    /// 订单号无法解析或不存在
    #[error("The order submitted by Charity Clear did not match any submitted orders.")]
    UnknownOrder {
        /// 回调中的原始订单号
        order_ref: String,
    },

    /// 未配置签名密钥
    #[error("CharityClear signature key is not configured")]
    MissingSecretKey,

    /// 非测试模式下未配置商户号
    #[error("CharityClear merchant ID is not configured")]
    MissingMerchantId,

    /// 订单金额无法转换为最小货币单位
    #[error("Invalid order total: {0}")]
    InvalidAmount(String),
}

impl GatewayError {
    /// 日志中使用的错误类别
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::SignatureMismatch => "signature_mismatch",
            GatewayError::GatewayDeclined { .. } => "gateway_declined",
            GatewayError::MissingOrderReference => "missing_order_reference",
            GatewayError::UnknownOrder { .. } => "unknown_order",
            GatewayError::MissingSecretKey => "missing_secret_key",
            GatewayError::MissingMerchantId => "missing_merchant_id",
            GatewayError::InvalidAmount(_) => "invalid_amount",
        }
    }
}

/// 订单存储错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderStoreError {
    #[error("Order {0} not found")]
    NotFound(u64),

    /// 订单已授权，重复的授权事件被拒绝
    #[error("Order {0} is already authorized")]
    AlreadyAuthorized(u64),

    #[error("Order store failure: {0}")]
    Storage(String),
}

/// 发起结账时的错误
#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error("Order {0} not found")]
    OrderNotFound(u64),

    #[error("Order {0} has already been paid")]
    AlreadyPaid(u64),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}
