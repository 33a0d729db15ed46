// 订单数据模型
// 订单系统协作方所需的最小订单视图

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use crate::models::{AuthorizedEvent, BillingAddress, CheckoutContext, CustomerContact};

/// 订单状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// 待支付
    #[default]
    Pending,
    /// 已授权
    Authorized,
}

/// 订单事件
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum OrderEvent {
    /// 支付授权 (authed)
    Authorized(AuthorizedEvent),
}

/// 订单
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    /// 订单总额
    pub total: Decimal,
    pub billing: BillingAddress,
    pub customer: CustomerContact,
    #[serde(default)]
    pub status: OrderStatus,
}

impl Order {
    pub fn new(id: u64, total: Decimal, billing: BillingAddress, customer: CustomerContact) -> Self {
        Self {
            id,
            total,
            billing,
            customer,
            status: OrderStatus::Pending,
        }
    }

    pub fn is_authorized(&self) -> bool {
        self.status == OrderStatus::Authorized
    }

    /// 构建结账上下文
    pub fn checkout_context(&self, return_url: &str) -> CheckoutContext {
        CheckoutContext {
            order_id: self.id,
            total: self.total,
            billing: self.billing.clone(),
            customer: self.customer.clone(),
            return_url: return_url.to_string(),
        }
    }
}
