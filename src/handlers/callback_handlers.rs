// 网关回调处理器
// 接收CharityClear回调，验签后重定向到感谢页或结账页

use std::collections::BTreeMap;
use actix_web::{http::header, web, HttpResponse};
use serde::Deserialize;
use crate::models::{CallbackResponse, IncomingCallback, CHANNEL_PARAM};
use crate::state::AppState;

/// 回调渠道查询参数
#[derive(Debug, Deserialize)]
pub struct ChannelQuery {
    pub rmtpay: Option<String>,
}

/// 网关回调 (表单)
///
/// POST /callback?rmtpay={module_id}
///
/// 先检查渠道再解析请求体
///
/// 响应: 302 重定向; 非本渠道回调 (无论请求体为何) 返回 404
pub async fn gateway_callback(
    data: web::Data<AppState>,
    query: web::Query<ChannelQuery>,
    body: web::Bytes,
) -> HttpResponse {
    let channel = query.into_inner().rmtpay;
    if !data.callbacks.accepts_channel(channel.as_deref()) {
        log::debug!("Ignoring callback for channel {:?}", channel);
        return HttpResponse::NotFound().finish();
    }

    let fields: BTreeMap<String, String> = url::form_urlencoded::parse(&body).into_owned().collect();
    let callback = IncomingCallback::new(channel, fields);
    callback_http_response(data.callbacks.handle(&callback))
}

/// 网关回调 (查询串)
///
/// GET /callback?rmtpay={module_id}&...
///
/// `rmtpay` 不参与签名
pub async fn gateway_callback_query(
    data: web::Data<AppState>,
    query: web::Query<BTreeMap<String, String>>,
) -> HttpResponse {
    let mut fields = query.into_inner();
    let channel = fields.remove(CHANNEL_PARAM);
    let callback = IncomingCallback::new(channel, fields);
    callback_http_response(data.callbacks.handle(&callback))
}

fn callback_http_response(response: CallbackResponse) -> HttpResponse {
    match response.location() {
        Some(location) => HttpResponse::Found()
            .insert_header((header::LOCATION, location))
            .finish(),
        None => HttpResponse::NotFound().finish(),
    }
}
