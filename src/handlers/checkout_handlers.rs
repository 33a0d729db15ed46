// 结账处理器
// 生成签名字段并返回自动提交到网关的跳转页

use actix_web::{http::header::ContentType, web, HttpResponse, Result as ActixResult};
use crate::error::CheckoutError;
use crate::models::ApiResponse;
use crate::state::AppState;

/// 发起结账
///
/// POST /checkout/{order_id}
///
/// 响应: 自动提交到CharityClear支付页的HTML
pub async fn start_checkout(
    data: web::Data<AppState>,
    path: web::Path<u64>,
) -> ActixResult<HttpResponse> {
    let order_id = path.into_inner();

    match data.checkout.redirect_page(order_id) {
        Ok(html) => Ok(HttpResponse::Ok().content_type(ContentType::html()).body(html)),
        Err(e) => Ok(checkout_error_response(order_id, &e)),
    }
}

/// 获取签名字段
///
/// GET /api/v1/checkout/{order_id}/fields
///
/// 响应: CheckoutFieldsResponse
pub async fn get_checkout_fields(
    data: web::Data<AppState>,
    path: web::Path<u64>,
) -> ActixResult<HttpResponse> {
    let order_id = path.into_inner();

    match data.checkout.checkout_fields(order_id) {
        Ok(fields) => Ok(HttpResponse::Ok().json(ApiResponse::success(fields))),
        Err(e) => Ok(checkout_error_response(order_id, &e)),
    }
}

fn checkout_error_response(order_id: u64, error: &CheckoutError) -> HttpResponse {
    match error {
        CheckoutError::OrderNotFound(_) => {
            HttpResponse::NotFound().json(ApiResponse::error(404, &error.to_string()))
        }
        CheckoutError::AlreadyPaid(_) => {
            HttpResponse::Conflict().json(ApiResponse::error(409, &error.to_string()))
        }
        CheckoutError::Gateway(e) => {
            log::error!("Failed to sign CharityClear checkout for order {}: {}", order_id, e);
            HttpResponse::InternalServerError().json(ApiResponse::error(500, "Internal server error"))
        }
    }
}
