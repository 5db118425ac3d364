use std::env;

/// Secrets fall back to a placeholder rather than failing startup; only the
/// model artifacts are load-or-die.
const PLACEHOLDER: &str = "not-configured";

#[derive(Clone)]
pub struct AppConfig {
    pub secret_key: String,
    pub weather_api_key: String,
    pub gemini_api_key: String,
    pub port: u16,
    pub disease_model_path: String,
    pub disease_class_count: usize,
    pub crop_model_path: String,
    pub crop_labels_path: String,
    pub templates_dir: String,
    pub static_dir: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            secret_key: env_or("SECRET_KEY", PLACEHOLDER),
            weather_api_key: env_or("WEATHER_API_KEY", PLACEHOLDER),
            gemini_api_key: env_or("GEMINI_API_KEY", PLACEHOLDER),
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5000),
            disease_model_path: env_or("DISEASE_MODEL_PATH", "models/plant_disease_cnn.pt"),
            disease_class_count: env::var("DISEASE_CLASS_COUNT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),
            crop_model_path: env_or("CROP_MODEL_PATH", "models/crop_recommendation.pt"),
            crop_labels_path: env_or("CROP_LABELS_PATH", "models/crop_labels.txt"),
            templates_dir: env_or("TEMPLATES_DIR", "templates"),
            static_dir: env_or("STATIC_DIR", "static"),
        }
    }

    /// True when the value was actually provided rather than left at the
    /// placeholder default.
    pub fn is_configured(value: &str) -> bool {
        !value.is_empty() && value != PLACEHOLDER
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
