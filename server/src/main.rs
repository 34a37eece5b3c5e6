mod classifier;
mod config;
mod error;
mod routes;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::http::header;
use actix_web::{web, App, HttpServer};
use env_logger::Env;

use classifier::artifact;
use classifier::model::{Model, OnnxModel};
use classifier::service::InferenceService;
use config::{Config, RunMode};
use routes::configure_routes;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(Env::new().default_filter_or("info"));

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                e.to_string(),
            ));
        }
    };

    let model = load_model(&config).await;
    if model.is_none() {
        log::error!(
            "Running degraded: /predict will answer 503 until the model is available and the service is restarted"
        );
    }
    let service = InferenceService::new(model, config.labels.clone());

    let bind_address = format!("0.0.0.0:{}", config.port);
    log::info!("Starting server on {} ({:?} mode)", bind_address, config.run_mode);

    let static_dir = config.static_dir.clone();
    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
                    .max_age(3600),
            )
            .app_data(web::Data::new(service.clone()))
            .configure(|cfg| configure_routes(cfg, static_dir.clone()))
    });

    // Development runs a single worker; production lets actix size the pool
    // from the host.
    if config.run_mode == RunMode::Development {
        server = server.workers(1);
    }

    server.bind(&bind_address)?.run().await
}

async fn load_model(config: &Config) -> Option<Arc<dyn Model>> {
    if let Err(e) = artifact::ensure_artifact(config.model_url.as_ref(), &config.model_path).await {
        log::error!("Failed to acquire model artifact: {}", e);
        return None;
    }
    match OnnxModel::load(&config.model_path) {
        Ok(model) => {
            log::info!("Model loaded from {}", config.model_path.display());
            Some(Arc::new(model))
        }
        Err(e) => {
            log::error!("Model loading failed: {}", e);
            None
        }
    }
}
