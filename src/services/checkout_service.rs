// 结账服务
// 查询订单、生成签名字段并渲染自动提交到网关的跳转页

use std::sync::Arc;
use crate::config::Config;
use crate::error::{CheckoutError, GatewayError};
use crate::models::{field, CheckoutFieldsResponse, SignedPayment};
use crate::services::{OrderStore, OutboundSigner};
use crate::utils::render_redirect_form;

/// 结账服务
pub struct CheckoutService {
    signer: OutboundSigner,
    orders: Arc<dyn OrderStore>,
    /// 网关回调地址 (redirectURL)
    callback_url: String,
    /// 表单提交目标
    action_url: String,
    /// 表单元素ID
    form_id: String,
}

impl CheckoutService {
    /// 创建结账服务
    pub fn new(config: &Config, orders: Arc<dyn OrderStore>) -> Result<Self, GatewayError> {
        Ok(Self {
            signer: OutboundSigner::new(&config.gateway)?,
            orders,
            callback_url: config.callback_url(),
            action_url: config.gateway.form_action_url().to_string(),
            form_id: config.gateway.module_id.clone(),
        })
    }

    pub fn action_url(&self) -> &str {
        &self.action_url
    }

    /// 为订单生成签名字段
    ///
    /// 每次调用都是一次新的结账尝试，交易唯一标识随时间变化。
    pub fn signed_payment(&self, order_id: u64) -> Result<SignedPayment, CheckoutError> {
        let order = self
            .orders
            .resolve_order(order_id)
            .ok_or(CheckoutError::OrderNotFound(order_id))?;

        if order.is_authorized() {
            return Err(CheckoutError::AlreadyPaid(order_id));
        }

        let signed = self.signer.build(&order.checkout_context(&self.callback_url))?;
        log::info!(
            "Prepared CharityClear checkout for order {} ({})",
            order_id,
            signed.fields.get(field::TRANSACTION_UNIQUE).map(String::as_str).unwrap_or("")
        );
        Ok(signed)
    }

    /// 签名字段的JSON描述
    pub fn checkout_fields(&self, order_id: u64) -> Result<CheckoutFieldsResponse, CheckoutError> {
        let signed = self.signed_payment(order_id)?;
        Ok(CheckoutFieldsResponse {
            action_url: self.action_url.clone(),
            fields: signed.form_fields(),
        })
    }

    /// 自动提交到网关的跳转页
    pub fn redirect_page(&self, order_id: u64) -> Result<String, CheckoutError> {
        let signed = self.signed_payment(order_id)?;
        Ok(render_redirect_form(&self.form_id, &self.action_url, &signed.form_fields()))
    }
}
