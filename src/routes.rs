use std::path::PathBuf;

use actix_files::{Files, NamedFile};
use actix_multipart::Multipart;
use actix_web::{Error, HttpResponse, web};
use futures_util::{StreamExt, TryStreamExt};
use log::error;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::chat::chat_service::{ChatGenerator, fallback_response};
use crate::error::ApiError;
use crate::inference::crop::{CropService, SoilSample, SoilSampleError};
use crate::inference::disease::DiseaseService;
use crate::weather::weather_service::{WeatherError, WeatherService};

/// Directory the page templates are served from.
#[derive(Clone)]
pub struct Pages {
    dir: PathBuf,
}

impl Pages {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    async fn open(&self, file: &str) -> Result<NamedFile, Error> {
        Ok(NamedFile::open_async(self.dir.join(file)).await?)
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig, static_dir: String) {
    cfg.service(web::resource("/api/weather").route(web::get().to(get_weather)))
        .service(web::resource("/api/disease-detect").route(web::post().to(detect_disease)))
        .service(web::resource("/api/crop-recommend").route(web::post().to(recommend_crop)))
        .service(web::resource("/api/chat").route(web::post().to(chat_with_ai)))
        .service(web::resource("/api/health").route(web::get().to(health)))
        .service(web::resource("/").route(web::get().to(home_page)))
        .service(web::resource("/disease-detection").route(web::get().to(disease_page)))
        .service(web::resource("/crop-recommendation").route(web::get().to(crop_page)))
        .service(web::resource("/government-schemes").route(web::get().to(schemes_page)))
        .service(web::resource("/weather-insights").route(web::get().to(weather_page)))
        .service(web::resource("/about").route(web::get().to(about_page)))
        .service(Files::new("/static", static_dir));
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

async fn home_page(pages: web::Data<Pages>) -> Result<NamedFile, Error> {
    pages.open("index.html").await
}

async fn disease_page(pages: web::Data<Pages>) -> Result<NamedFile, Error> {
    pages.open("disease-detection.html").await
}

async fn crop_page(pages: web::Data<Pages>) -> Result<NamedFile, Error> {
    pages.open("crop-recommendation.html").await
}

async fn schemes_page(pages: web::Data<Pages>) -> Result<NamedFile, Error> {
    pages.open("government-schemes.html").await
}

async fn weather_page(pages: web::Data<Pages>) -> Result<NamedFile, Error> {
    pages.open("weather-insights.html").await
}

async fn about_page(pages: web::Data<Pages>) -> Result<NamedFile, Error> {
    pages.open("about.html").await
}

#[derive(Deserialize)]
struct WeatherQuery {
    city: Option<String>,
}

async fn get_weather(
    service: web::Data<WeatherService>,
    query: web::Query<WeatherQuery>,
) -> Result<HttpResponse, Error> {
    let city = query.city.as_deref().unwrap_or("Delhi");

    match service.current(city).await {
        Ok(report) => Ok(HttpResponse::Ok().json(report)),
        Err(WeatherError::Fetch(e)) => {
            error!("Weather request for {} failed: {:?}", city, e);
            Err(ApiError::WeatherFetch.into())
        }
        Err(WeatherError::Format(e)) => {
            error!("Weather payload for {} was malformed: {}", city, e);
            Err(ApiError::WeatherFormat.into())
        }
    }
}

async fn detect_disease(
    service: web::Data<DiseaseService>,
    mut payload: Multipart,
) -> Result<HttpResponse, Error> {
    // First field named "image" wins; later duplicates are drained and
    // discarded so they cannot bleed into the buffer.
    let mut image_data: Option<Vec<u8>> = None;
    while let Ok(Some(mut field)) = payload.try_next().await {
        let wanted = field.name() == Some("image") && image_data.is_none();
        let mut buf = Vec::new();
        while let Some(chunk) = field.next().await {
            let data = chunk?;
            if wanted {
                buf.extend_from_slice(&data);
            }
        }
        if wanted {
            image_data = Some(buf);
        }
    }

    // An absent field is the caller's mistake; a present but empty or
    // undecodable upload fails analysis instead.
    let Some(image_data) = image_data else {
        return Err(ApiError::MissingImage.into());
    };

    match service.detect(&image_data) {
        Ok(report) => Ok(HttpResponse::Ok().json(report)),
        Err(e) => {
            error!("Disease detection failed: {:?}", e);
            Err(ApiError::ImageAnalysis.into())
        }
    }
}

async fn recommend_crop(
    service: web::Data<CropService>,
    body: web::Json<Value>,
) -> Result<HttpResponse, Error> {
    let sample = SoilSample::from_json(&body).map_err(|e| match e {
        SoilSampleError::MissingFields => ApiError::MissingFields,
        SoilSampleError::NotNumeric(field) => {
            error!("Soil sample field {} could not be coerced", field);
            ApiError::Prediction
        }
    })?;

    match service.recommend(&sample) {
        Ok(crop) => Ok(HttpResponse::Ok().json(json!({ "recommendedCrop": crop }))),
        Err(e) => {
            error!("Crop recommendation failed: {:?}", e);
            Err(ApiError::Prediction.into())
        }
    }
}

#[derive(Deserialize)]
struct ChatRequest {
    #[serde(default)]
    message: String,
    #[serde(default = "default_language")]
    language: String,
}

fn default_language() -> String {
    "en".to_string()
}

async fn chat_with_ai(
    service: web::Data<dyn ChatGenerator>,
    body: web::Json<ChatRequest>,
) -> Result<HttpResponse, Error> {
    // Fixed up front so the success and fallback paths agree on the language.
    let language = body.language.clone();

    if body.message.trim().is_empty() {
        return Err(ApiError::EmptyMessage.into());
    }

    let text = match service.generate(&body.message, &language).await {
        Ok(text) => text,
        Err(e) => {
            error!("Chat generation failed: {:?}", e);
            fallback_response(&language).to_string()
        }
    };

    Ok(HttpResponse::Ok().json(json!({ "response": text })))
}
