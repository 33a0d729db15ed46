use std::error::Error;
use std::io;
use std::io::Write;
use std::sync::Arc;
use actix_web::{web, App, HttpServer};
use chrono::Local;
use log::info;
use charityclear_gateway::config::Config;
use charityclear_gateway::middleware::{create_cors, RequestLogging};
use charityclear_gateway::routes::{api_v1_routes, public_routes};
use charityclear_gateway::services::InMemoryOrderStore;
use charityclear_gateway::state::AppState;

#[actix_web::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // 初始化日志
    let mut log_builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    log_builder
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S %:z"),
                record.level(),
                record.args()
            )
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e)) // 转换为 io::Result
        })
        .init();

    let config = Config::from_env()?;
    config.validate()?;

    let bind_address = config.bind_address();
    let workers = config.server.workers;
    let allowed_origins = config.server.allowed_origins.clone();
    info!(
        "CharityClear gateway starting on {} (test mode: {}, callback: {})",
        bind_address,
        config.gateway.test_mode,
        config.callback_url()
    );

    // 独立运行时使用内存订单存储，嵌入订单系统时替换为其 OrderStore 实现
    let orders = Arc::new(InMemoryOrderStore::new());
    let app_state = web::Data::new(AppState::new(config, orders)?);

    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(create_cors(&allowed_origins))
            .wrap(RequestLogging)
            .service(api_v1_routes())
            .service(public_routes())
    });
    if let Some(workers) = workers {
        server = server.workers(workers);
    }

    server.bind(bind_address)?.run().await?;
    info!("CharityClear gateway stopped");
    Ok(())
}
