// 出站签名服务
// 为每次结账尝试生成发往网关的有序签名字段集合，纯计算、无网络I/O

use std::collections::BTreeMap;
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::models::{
    field, CheckoutContext, OutgoingPayment, SignedPayment, TransactionAction, TransactionType,
};
use crate::utils::signature_digest;

/// 出站签名器
#[derive(Debug, Clone)]
pub struct OutboundSigner {
    merchant_id: u64,
    secret_key: String,
}

impl OutboundSigner {
    /// 创建签名器
    ///
    /// 缺少密钥或 (非测试模式下) 缺少商户号时直接失败，不会产出错误的签名。
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        if config.secret_key.trim().is_empty() {
            return Err(GatewayError::MissingSecretKey);
        }

        Ok(Self {
            merchant_id: config.effective_merchant_id()?,
            secret_key: config.secret_key.clone(),
        })
    }

    /// 当前使用的商户号
    pub fn merchant_id(&self) -> u64 {
        self.merchant_id
    }

    /// 以当前时间构建签名字段
    pub fn build(&self, checkout: &CheckoutContext) -> Result<SignedPayment, GatewayError> {
        self.build_at(checkout, Utc::now())
    }

    /// 以指定时间构建签名字段
    pub fn build_at(
        &self,
        checkout: &CheckoutContext,
        now: DateTime<Utc>,
    ) -> Result<SignedPayment, GatewayError> {
        let payment = self.outgoing_payment(checkout, now)?;
        Ok(self.sign(&payment))
    }

    /// 组装签名前的支付请求
    pub fn outgoing_payment(
        &self,
        checkout: &CheckoutContext,
        now: DateTime<Utc>,
    ) -> Result<OutgoingPayment, GatewayError> {
        let mut customer_fields = BTreeMap::new();
        customer_fields.insert(
            field::CUSTOMER_ADDRESS.to_string(),
            checkout.billing.composed_address(),
        );
        customer_fields.insert(field::CUSTOMER_NAME.to_string(), checkout.billing.name.clone());
        customer_fields.insert(
            field::CUSTOMER_POSTCODE.to_string(),
            checkout.billing.postcode.clone(),
        );
        customer_fields.insert(field::CUSTOMER_EMAIL.to_string(), checkout.customer.email.clone());
        customer_fields.insert(field::CUSTOMER_PHONE.to_string(), checkout.customer.phone.clone());

        Ok(OutgoingPayment {
            merchant_id: self.merchant_id,
            amount_minor_units: to_minor_units(checkout.total)?,
            transaction_unique: transaction_unique(checkout.order_id, now),
            action: TransactionAction::Sale,
            transaction_type: TransactionType::Ecommerce,
            redirect_url: checkout.return_url.clone(),
            order_ref: checkout.order_id,
            customer_fields,
        })
    }

    /// 对支付请求签名
    pub fn sign(&self, payment: &OutgoingPayment) -> SignedPayment {
        let fields = payment.to_fields();
        let signature = sign_fields(&fields, &self.secret_key);
        SignedPayment { fields, signature }
    }
}

/// 对任意字段集合签名
///
/// 结果为 `hex(SHA512(规范查询串 + 密钥)) + "|" + 逗号连接的字段名`，
/// 字段名顺序与 `BTreeMap` 的键序一致。
pub fn sign_fields(fields: &BTreeMap<String, String>, secret: &str) -> String {
    let names = fields.keys().map(String::as_str).collect::<Vec<_>>().join(",");
    format!("{}|{}", signature_digest(fields, secret), names)
}

/// 将订单总额转换为最小货币单位
///
/// 定点运算: 乘以100后四舍五入 (0.5 远离零方向进位) 到整数。
/// 负数金额或超出 i64 范围时返回 `InvalidAmount`。
pub fn to_minor_units(total: Decimal) -> Result<i64, GatewayError> {
    if total.is_sign_negative() && !total.is_zero() {
        return Err(GatewayError::InvalidAmount(format!("{} is negative", total)));
    }

    total
        .checked_mul(Decimal::ONE_HUNDRED)
        .map(|cents| cents.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|cents| cents.to_i64())
        .ok_or_else(|| GatewayError::InvalidAmount(format!("{} is out of range", total)))
}

/// 生成交易唯一标识 `MMDDYY-HHMMSS-订单号` (UTC)
///
/// 精度为秒: 同一订单在同一秒内的两次尝试会得到相同的标识，网关按重复交易处理。
pub fn transaction_unique(order_id: u64, now: DateTime<Utc>) -> String {
    format!("{}-{}", now.format("%m%d%y-%H%M%S"), order_id)
}
