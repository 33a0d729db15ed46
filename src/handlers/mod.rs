// API处理器模块
// 包含结账跳转、网关回调、健康检查等HTTP请求处理逻辑

pub mod callback_handlers;
pub mod checkout_handlers;
pub mod health_handlers;

// 重新导出处理器
pub use callback_handlers::*;
pub use checkout_handlers::*;
pub use health_handlers::*;
