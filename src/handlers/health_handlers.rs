// 健康检查处理器
// 提供服务状态与网关模式查询接口

use actix_web::{web, HttpResponse, Result as ActixResult};
use serde::Serialize;
use crate::models::ApiResponse;
use crate::state::AppState;

/// 系统健康检查响应
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// 服务状态
    pub status: String,
    /// 版本信息
    pub version: String,
    /// 回调渠道标识
    pub module_id: String,
    /// 是否处于测试模式
    pub test_mode: bool,
    /// 表单提交目标
    pub gateway_url: String,
    /// 当前时间戳
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// 基础健康检查
///
/// GET /health
///
/// 无需认证
/// 响应: HealthResponse
pub async fn health_check(data: web::Data<AppState>) -> ActixResult<HttpResponse> {
    let health = HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        module_id: data.config.gateway.module_id.clone(),
        test_mode: data.config.gateway.test_mode,
        gateway_url: data.checkout.action_url().to_string(),
        timestamp: chrono::Utc::now(),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(health)))
}
