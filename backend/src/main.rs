mod config;
mod error;
mod gallery;
mod inference;
mod routes;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use config::AppConfig;
use gallery::Gallery;
use inference::{ArtifactStore, Classifier, HttpSource, TorchModel};
use routes::{UploadLimit, configure_routes};
use std::env;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    if let Ok(current_dir) = env::current_dir() {
        log::info!("Current working directory: {}", current_dir.display());
    } else {
        log::error!("Failed to get the current working directory.");
    }

    let config = AppConfig::load().map_err(startup_error)?;

    // Any failure here stops the process before binding.
    let store = ArtifactStore::from_config(&config.model);
    let source = HttpSource::new(config.model.download_timeout()).map_err(startup_error)?;
    let model_path = store.ensure(&source).await.map_err(startup_error)?;
    let model = TorchModel::load(model_path, store.identifier()).map_err(startup_error)?;

    let classifier = web::Data::new(Classifier::new(Arc::new(model)));
    let gallery = web::Data::new(Gallery::new(config.gallery.dir.clone()));
    let upload_limit = web::Data::new(UploadLimit(config.server.max_upload_bytes));
    let frontend_dir = config.server.frontend_dir.clone();

    let bind_address = config.bind_address();
    log::info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .max_age(3600),
            )
            .app_data(classifier.clone())
            .app_data(gallery.clone())
            .app_data(upload_limit.clone())
            .configure(|cfg| configure_routes(cfg, frontend_dir.clone()))
    })
    .bind(&bind_address)?
    .run()
    .await
}

fn startup_error<E: std::fmt::Display>(e: E) -> std::io::Error {
    log::error!("Startup failed: {}", e);
    std::io::Error::other(e.to_string())
}
