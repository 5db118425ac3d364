mod chat;
mod config;
mod error;
mod inference;
mod routes;
mod weather;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use chat::chat_service::{ChatGenerator, ChatService};
use config::AppConfig;
use inference::crop::CropService;
use inference::disease::{DiseaseCatalog, DiseaseService};
use inference::model::{TorchCropModel, TorchImageModel};
use routes::{Pages, configure_routes};
use weather::weather_service::WeatherService;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    dotenv::dotenv().ok();

    let config = AppConfig::from_env();

    if !AppConfig::is_configured(&config.secret_key) {
        log::warn!("SECRET_KEY is not set; using a placeholder value");
    }
    if !AppConfig::is_configured(&config.weather_api_key) {
        log::warn!("WEATHER_API_KEY is not set; weather lookups will fail upstream");
    }
    if !AppConfig::is_configured(&config.gemini_api_key) {
        log::warn!("GEMINI_API_KEY is not set; chat will serve fallback responses");
    }

    let classifier = TorchImageModel::load(&config.disease_model_path, config.disease_class_count)
        .map_err(|e| {
            log::error!("Failed to load disease model at startup: {:?}", e);
            std::io::Error::other(format!("Disease model loading failed: {:?}", e))
        })?;
    log::info!("Loaded disease classifier from {}", config.disease_model_path);

    let disease_service = DiseaseService::new(Arc::new(classifier), DiseaseCatalog::builtin())
        .map_err(|e| {
            log::error!("Disease catalog check failed: {}", e);
            std::io::Error::other(format!("Disease catalog check failed: {}", e))
        })?;

    let crop_model = TorchCropModel::load(&config.crop_model_path, &config.crop_labels_path)
        .map_err(|e| {
            log::error!("Failed to load crop model at startup: {:?}", e);
            std::io::Error::other(format!("Crop model loading failed: {:?}", e))
        })?;
    log::info!("Loaded crop recommender from {}", config.crop_model_path);

    let disease_service = web::Data::new(disease_service);
    let crop_service = web::Data::new(CropService::new(Arc::new(crop_model)));
    let weather_service = web::Data::new(WeatherService::new(config.weather_api_key.clone()));
    let chat_service: web::Data<dyn ChatGenerator> =
        web::Data::from(Arc::new(ChatService::new(config.gemini_api_key.clone()))
            as Arc<dyn ChatGenerator>);
    let pages = web::Data::new(Pages::new(config.templates_dir.clone()));

    let bind_address = format!("0.0.0.0:{}", config.port);
    log::info!("Starting server on {}", bind_address);

    let static_dir = config.static_dir.clone();
    HttpServer::new(move || {
        App::new()
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
            .app_data(disease_service.clone())
            .app_data(crop_service.clone())
            .app_data(weather_service.clone())
            .app_data(chat_service.clone())
            .app_data(pages.clone())
            .configure(|cfg| configure_routes(cfg, static_dir.clone()))
    })
    .bind(&bind_address)?
    .run()
    .await
}
