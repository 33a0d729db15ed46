// 工具函数模块
// 包含表单编码、签名摘要、输入验证、跳转表单渲染等通用工具

pub mod crypto;
pub mod encoding;
pub mod form;
pub mod validation;

// 重新导出常用函数
pub use crypto::*;
pub use encoding::*;
pub use form::*;
pub use validation::*;
