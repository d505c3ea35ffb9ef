mod backend;
mod config;
mod encoding;
mod error;
mod handlers;
mod models;
mod parse;
mod pipeline;
mod rank;
mod render;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use clap::Parser;
use log::{error, info};

use crate::backend::BackendClient;
use crate::config::Config;
use crate::handlers::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let config = Config::parse();

    let backend = BackendClient::new(config.serving_address(), config.backend_timeout())
        .map_err(|e| {
            error!("Failed to build backend client: {}", e);
            std::io::Error::other(e)
        })?;

    match config.backend_timeout() {
        Some(timeout) => info!("Backend calls time out after {:?}", timeout),
        None => info!("Backend calls have no timeout"),
    }
    info!(
        "Forwarding to {}, showing top {} labels",
        backend.address(),
        config.num_results()
    );

    let state = web::Data::new(AppState {
        backend,
        num_results: config.num_results(),
        max_upload_bytes: config.max_upload_bytes,
    });

    let listen = config.listen_address();
    info!("Listening at {}:{}...", listen.0, listen.1);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST"])
            .allow_any_header();

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(state.clone())
            .configure(handlers::routes)
    })
    .bind(listen)?
    .run()
    .await
}
