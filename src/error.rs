use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Request-boundary error taxonomy. Client mistakes map to 400, everything
/// server-side or upstream maps to 500 with an opaque message; the underlying
/// cause is logged at the handler, never exposed in the body.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("No image provided")]
    MissingImage,
    #[error("Missing input fields")]
    MissingFields,
    #[error("Message cannot be empty")]
    EmptyMessage,
    #[error("Failed to analyze image")]
    ImageAnalysis,
    #[error("Prediction failed")]
    Prediction,
    #[error("Failed to fetch weather data")]
    WeatherFetch,
    #[error("Invalid weather data format")]
    WeatherFormat,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingImage | ApiError::MissingFields | ApiError::EmptyMessage => {
                StatusCode::BAD_REQUEST
            }
            ApiError::ImageAnalysis
            | ApiError::Prediction
            | ApiError::WeatherFetch
            | ApiError::WeatherFormat => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_are_400() {
        assert_eq!(ApiError::MissingImage.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::MissingFields.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::EmptyMessage.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn server_and_upstream_errors_are_500() {
        for err in [
            ApiError::ImageAnalysis,
            ApiError::Prediction,
            ApiError::WeatherFetch,
            ApiError::WeatherFormat,
        ] {
            assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn body_is_a_json_error_object() {
        let response = ApiError::WeatherFetch.error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
