// 服务层模块
// 包含出站签名、入站验签以及结账/回调编排服务

pub mod callback_service;
pub mod checkout_service;
pub mod inbound_verifier;
pub mod order_store;
pub mod outbound_signer;

// 重新导出服务
pub use callback_service::CallbackService;
pub use checkout_service::CheckoutService;
pub use inbound_verifier::InboundVerifier;
pub use order_store::{InMemoryOrderStore, OrderStore};
pub use outbound_signer::OutboundSigner;
