// 回调处理服务
// 将验签结果应用到订单存储，并转换为感谢页/结账页重定向

use std::sync::Arc;
use crate::config::ShopConfig;
use crate::error::OrderStoreError;
use crate::models::{CallbackOutcome, CallbackResponse, IncomingCallback, OrderEvent};
use crate::services::{InboundVerifier, OrderStore};

/// 订单记录失败时展示给用户的消息
const RECORD_FAILED_MESSAGE: &str =
    "Your payment could not be recorded against this order, please contact support.";

/// 回调处理服务
pub struct CallbackService {
    verifier: InboundVerifier,
    orders: Arc<dyn OrderStore>,
    shop: ShopConfig,
}

impl CallbackService {
    pub fn new(verifier: InboundVerifier, orders: Arc<dyn OrderStore>, shop: ShopConfig) -> Self {
        Self { verifier, orders, shop }
    }

    /// 是否接收该渠道的回调
    pub fn accepts_channel(&self, channel: Option<&str>) -> bool {
        self.verifier.owns_channel(channel)
    }

    /// 处理一次网关回调
    ///
    /// 验签通过且授权事件已记录 (含重复投递) 时重定向到感谢页，
    /// 订单存储故障时重定向回结账页。
    pub fn handle(&self, callback: &IncomingCallback) -> CallbackResponse {
        match self.verifier.verify(callback, self.orders.as_ref()) {
            CallbackOutcome::Ignored => CallbackResponse::Ignored,
            CallbackOutcome::Rejected(e) => self.checkout_redirect(&e.to_string()),
            CallbackOutcome::Authorized(event) => {
                let order_id = event.order_id;
                let transaction_id = event.transaction_id.clone();
                let amount = event.amount;

                match self.orders.record_event(order_id, OrderEvent::Authorized(event)) {
                    Ok(()) => {
                        log::info!(
                            "Order {} authorized by CharityClear (xref {}, amount {})",
                            order_id, transaction_id, amount
                        );
                        self.thanks_redirect()
                    }
                    // 重复投递: 订单已入账，不再记录
                    Err(OrderStoreError::AlreadyAuthorized(_)) => {
                        log::info!(
                            "Order {} already authorized, ignoring repeated CharityClear callback (xref {})",
                            order_id, transaction_id
                        );
                        self.thanks_redirect()
                    }
                    Err(e) => {
                        log::error!(
                            "Failed to record CharityClear authorization for order {}: {}",
                            order_id, e
                        );
                        self.checkout_redirect(RECORD_FAILED_MESSAGE)
                    }
                }
            }
        }
    }

    fn thanks_redirect(&self) -> CallbackResponse {
        CallbackResponse::Thanks {
            location: self.shop.thanks_url.clone(),
        }
    }

    fn checkout_redirect(&self, message: &str) -> CallbackResponse {
        CallbackResponse::Checkout {
            location: self.shop.checkout_redirect(message),
            message: message.to_string(),
        }
    }
}
