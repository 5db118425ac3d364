use std::sync::Arc;

use serde_json::Value;

use crate::inference::InferenceError;
use crate::inference::model::CropPredictor;

/// Feature order the tabular predictor was trained with.
pub const SOIL_FEATURE_KEYS: [&str; 7] = [
    "N",
    "P",
    "K",
    "temperature",
    "humidity",
    "ph",
    "rainfall",
];

#[derive(Debug, thiserror::Error)]
pub enum SoilSampleError {
    #[error("missing input fields")]
    MissingFields,
    #[error("field {0} is not numeric")]
    NotNumeric(String),
}

#[derive(Debug, PartialEq)]
pub struct SoilSample {
    features: [f32; 7],
}

impl SoilSample {
    /// All seven keys must be present; presence is checked before coercion so
    /// an absent field is always reported as `MissingFields`.
    pub fn from_json(body: &Value) -> Result<Self, SoilSampleError> {
        if SOIL_FEATURE_KEYS.iter().any(|key| body.get(key).is_none()) {
            return Err(SoilSampleError::MissingFields);
        }

        let mut features = [0.0f32; 7];
        for (slot, key) in features.iter_mut().zip(SOIL_FEATURE_KEYS) {
            let value = body.get(key).ok_or(SoilSampleError::MissingFields)?;
            *slot = coerce_f32(value).ok_or_else(|| SoilSampleError::NotNumeric(key.to_string()))?;
        }
        Ok(Self { features })
    }

    pub fn features(&self) -> &[f32; 7] {
        &self.features
    }
}

fn coerce_f32(value: &Value) -> Option<f32> {
    match value {
        Value::Number(n) => n.as_f64().map(|v| v as f32),
        Value::String(s) => s.trim().parse::<f32>().ok(),
        _ => None,
    }
}

pub struct CropService {
    model: Arc<dyn CropPredictor>,
}

impl CropService {
    pub fn new(model: Arc<dyn CropPredictor>) -> Self {
        Self { model }
    }

    pub fn recommend(&self, sample: &SoilSample) -> Result<String, InferenceError> {
        self.model.predict(sample.features())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn full_body() -> Value {
        json!({
            "N": 90, "P": 42, "K": 43,
            "temperature": 20.8, "humidity": 82, "ph": 6.5, "rainfall": 202.9
        })
    }

    #[test]
    fn features_keep_training_order() {
        let sample = SoilSample::from_json(&full_body()).unwrap();
        assert_eq!(
            sample.features(),
            &[90.0, 42.0, 43.0, 20.8, 82.0, 6.5, 202.9]
        );
    }

    #[test]
    fn any_missing_field_is_rejected() {
        for key in SOIL_FEATURE_KEYS {
            let mut body = full_body();
            body.as_object_mut().unwrap().remove(key);
            let err = SoilSample::from_json(&body).unwrap_err();
            assert!(matches!(err, SoilSampleError::MissingFields), "key {key}");
        }
    }

    #[test]
    fn numeric_strings_are_coerced() {
        let mut body = full_body();
        body["N"] = json!("90");
        body["ph"] = json!(" 6.5 ");
        let sample = SoilSample::from_json(&body).unwrap();
        assert_eq!(sample.features()[0], 90.0);
        assert_eq!(sample.features()[5], 6.5);
    }

    #[test]
    fn non_numeric_values_are_rejected_by_field() {
        let mut body = full_body();
        body["humidity"] = json!(true);
        let err = SoilSample::from_json(&body).unwrap_err();
        assert!(matches!(err, SoilSampleError::NotNumeric(key) if key == "humidity"));
    }

    #[test]
    fn missing_field_wins_over_bad_coercion() {
        let mut body = full_body();
        body["rainfall"] = json!("wet");
        body.as_object_mut().unwrap().remove("N");
        let err = SoilSample::from_json(&body).unwrap_err();
        assert!(matches!(err, SoilSampleError::MissingFields));
    }

    struct FixedCrop(&'static str);

    impl CropPredictor for FixedCrop {
        fn predict(&self, features: &[f32]) -> Result<String, InferenceError> {
            assert_eq!(features.len(), 7);
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn recommend_passes_features_through_to_the_model() {
        let service = CropService::new(Arc::new(FixedCrop("rice")));
        let sample = SoilSample::from_json(&full_body()).unwrap();
        assert_eq!(service.recommend(&sample).unwrap(), "rice");
    }
}
