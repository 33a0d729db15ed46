// 订单存储协作方
// 订单系统通过该接口提供订单查询与事件落地，内置内存实现用于独立运行与测试

use std::collections::HashMap;
use std::sync::RwLock;
use crate::error::OrderStoreError;
use crate::models::{Order, OrderEvent, OrderStatus};

/// 订单存储接口
///
/// `record_event` 必须保证授权转换的幂等性: 已授权订单上的第二次授权需要被拒绝，
/// 网关的重复投递不能造成重复入账。
pub trait OrderStore: Send + Sync {
    /// 按订单号查询订单
    fn resolve_order(&self, order_id: u64) -> Option<Order>;

    /// 记录订单事件并完成状态转换
    fn record_event(&self, order_id: u64, event: OrderEvent) -> Result<(), OrderStoreError>;
}

/// 内存订单存储
#[derive(Default)]
pub struct InMemoryOrderStore {
    orders: RwLock<HashMap<u64, OrderRecord>>,
}

struct OrderRecord {
    order: Order,
    events: Vec<OrderEvent>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 新增或替换订单
    pub fn insert(&self, order: Order) {
        let mut orders = self.orders.write().unwrap_or_else(|e| e.into_inner());
        orders.insert(order.id, OrderRecord { order, events: Vec::new() });
    }

    /// 订单上已记录的事件
    pub fn events(&self, order_id: u64) -> Vec<OrderEvent> {
        let orders = self.orders.read().unwrap_or_else(|e| e.into_inner());
        orders
            .get(&order_id)
            .map(|record| record.events.clone())
            .unwrap_or_default()
    }
}

impl OrderStore for InMemoryOrderStore {
    fn resolve_order(&self, order_id: u64) -> Option<Order> {
        let orders = self.orders.read().unwrap_or_else(|e| e.into_inner());
        orders.get(&order_id).map(|record| record.order.clone())
    }

    fn record_event(&self, order_id: u64, event: OrderEvent) -> Result<(), OrderStoreError> {
        let mut orders = self
            .orders
            .write()
            .map_err(|e| OrderStoreError::Storage(e.to_string()))?;
        let record = orders
            .get_mut(&order_id)
            .ok_or(OrderStoreError::NotFound(order_id))?;

        // 检查与状态转换在同一把写锁内完成
        match &event {
            OrderEvent::Authorized(_) => {
                if record.order.is_authorized() {
                    return Err(OrderStoreError::AlreadyAuthorized(order_id));
                }
                record.order.status = OrderStatus::Authorized;
            }
        }

        record.events.push(event);
        Ok(())
    }
}
