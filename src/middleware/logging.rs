// 请求日志中间件
// 记录请求方法、路径、耗时、状态码及重定向目标；不记录查询串 (回调查询串含签名与客户信息)

use actix_web::{
    dev::{ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error,
};
use futures_util::future::{ok, Ready};
use std::task::{Context, Poll};
use std::pin::Pin;
use std::future::Future;
use std::time::Instant;

/// 请求日志中间件
pub struct RequestLogging;

impl<S, B> Transform<S, ServiceRequest> for RequestLogging
where
    S: actix_web::dev::Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RequestLoggingMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(RequestLoggingMiddleware { service })
    }
}

pub struct RequestLoggingMiddleware<S> {
    service: S,
}

impl<S, B> actix_web::dev::Service<ServiceRequest> for RequestLoggingMiddleware<S>
where
    S: actix_web::dev::Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start_time = Instant::now();
        let method = req.method().to_string();
        let path = req.path().to_string();
        let remote_addr = req.connection_info().realip_remote_addr()
            .unwrap_or("unknown")
            .to_string();

        let fut = self.service.call(req);

        Box::pin(async move {
            let result = fut.await;
            let duration = start_time.elapsed();

            match &result {
                Ok(response) => {
                    let status = response.status().as_u16();
                    let target = redirect_target(response);

                    if status == 404 && path == "/callback" {
                        // 其他渠道的回调
                        log::debug!(
                            "{} {} {} {}ms - {} (not ours)",
                            remote_addr, method, path, duration.as_millis(), status
                        );
                    } else if status >= 400 {
                        log::warn!(
                            "{} {} {} {}ms - {}",
                            remote_addr, method, path, duration.as_millis(), status
                        );
                    } else if let Some(target) = target {
                        log::info!(
                            "{} {} {} {}ms - {} -> {}",
                            remote_addr, method, path, duration.as_millis(), status, target
                        );
                    } else {
                        log::info!(
                            "{} {} {} {}ms - {}",
                            remote_addr, method, path, duration.as_millis(), status
                        );
                    }
                },
                Err(e) => {
                    log::error!(
                        "{} {} {} {}ms - ERROR: {}",
                        remote_addr, method, path, duration.as_millis(), e
                    );
                }
            }

            result
        })
    }
}

/// 重定向目标 (去掉查询串)
fn redirect_target<B>(response: &ServiceResponse<B>) -> Option<String> {
    let location = response.headers().get(header::LOCATION)?.to_str().ok()?;
    Some(location.split('?').next().unwrap_or(location).to_string())
}
