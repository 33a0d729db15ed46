// CharityClear 托管支付网关集成
// 出站请求签名与入站回调验签，以及承载它们的actix-web服务

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

pub use config::{Config, GatewayConfig, ShopConfig};
pub use error::{CheckoutError, GatewayError, OrderStoreError};
pub use services::{InboundVerifier, OrderStore, OutboundSigner};
