// 应用状态管理
// 包含配置信息、结账与回调服务等全局状态

use std::sync::Arc;
use anyhow::{Context, Result};
use crate::config::Config;
use crate::services::{CallbackService, CheckoutService, InboundVerifier, OrderStore};

/// 应用全局状态
pub struct AppState {
    /// 应用配置
    pub config: Config,
    /// 结账服务
    pub checkout: CheckoutService,
    /// 回调处理服务
    pub callbacks: CallbackService,
}

impl AppState {
    /// 创建新的应用状态实例
    ///
    /// # Arguments
    /// * `config` - 应用配置
    /// * `orders` - 订单存储
    ///
    /// # Returns
    /// * 应用状态实例，网关配置不完整时返回错误
    pub fn new(config: Config, orders: Arc<dyn OrderStore>) -> Result<Self> {
        let checkout = CheckoutService::new(&config, orders.clone())
            .context("Failed to initialise CharityClear checkout")?;
        let verifier = InboundVerifier::new(&config.gateway)
            .context("Failed to initialise CharityClear callback verification")?;
        let callbacks = CallbackService::new(verifier, orders, config.shop.clone());

        Ok(Self {
            config,
            checkout,
            callbacks,
        })
    }

    /// 创建测试用的应用状态，内置订单 42 (19.99)
    #[cfg(test)]
    pub fn new_for_test() -> (Self, Arc<crate::services::InMemoryOrderStore>) {
        use crate::models::{BillingAddress, CustomerContact, Order};
        use crate::services::InMemoryOrderStore;

        let mut config = Config::default();
        config.gateway.secret_key = "Circle4Take40Idea".to_string();

        let store = Arc::new(InMemoryOrderStore::new());
        store.insert(Order::new(
            42,
            rust_decimal::Decimal::new(1999, 2),
            BillingAddress {
                name: "Jane Doe".to_string(),
                address: "1 High Street".to_string(),
                city: "Leeds".to_string(),
                country: "GB".to_string(),
                postcode: "LS1 4AP".to_string(),
                ..Default::default()
            },
            CustomerContact {
                email: "jane@example.com".to_string(),
                phone: "0113 496 0000".to_string(),
            },
        ));

        let state = Self::new(config, store.clone()).expect("test config is valid");
        (state, store)
    }
}
