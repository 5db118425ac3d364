use std::sync::Arc;

use serde::Serialize;

use crate::inference::model::ImageClassifier;
use crate::inference::preprocess::prepare_image;
use crate::inference::{InferenceError, argmax};

pub struct DiseaseRecord {
    pub label: &'static str,
    pub description: &'static str,
    pub treatment: &'static str,
}

const BUILTIN_CATALOG: &[DiseaseRecord] = &[
    DiseaseRecord {
        label: "Leaf Blight",
        description: "Bacterial infection affecting leaf tissue.",
        treatment: "Apply copper-based fungicide and remove affected leaves.",
    },
    DiseaseRecord {
        label: "Powdery Mildew",
        description: "Fungal disease creating white powdery spots.",
        treatment: "Use neem oil spray and sulfur-based treatments.",
    },
    DiseaseRecord {
        label: "Healthy Plant",
        description: "No visible signs of infection. Looks healthy.",
        treatment: "Maintain proper watering and pest monitoring.",
    },
];

/// Ordered table of disease records, indexed by classifier class id.
pub struct DiseaseCatalog {
    records: &'static [DiseaseRecord],
}

impl DiseaseCatalog {
    pub fn builtin() -> Self {
        Self {
            records: BUILTIN_CATALOG,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&DiseaseRecord> {
        self.records.get(index)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("catalog has {catalog} entries but classifier outputs {classes} classes")]
pub struct CatalogMismatch {
    pub catalog: usize,
    pub classes: usize,
}

#[derive(Debug, Serialize)]
pub struct DiseaseReport {
    pub disease: String,
    pub confidence: f32,
    pub description: String,
    pub treatment: String,
}

pub struct DiseaseService {
    model: Arc<dyn ImageClassifier>,
    catalog: DiseaseCatalog,
}

impl std::fmt::Debug for DiseaseService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiseaseService").finish_non_exhaustive()
    }
}

impl DiseaseService {
    /// Fails if the catalog row count does not match the classifier's output
    /// dimension; a mismatch would make every lookup meaningless.
    pub fn new(
        model: Arc<dyn ImageClassifier>,
        catalog: DiseaseCatalog,
    ) -> Result<Self, CatalogMismatch> {
        if model.class_count() != catalog.len() {
            return Err(CatalogMismatch {
                catalog: catalog.len(),
                classes: model.class_count(),
            });
        }
        Ok(Self { model, catalog })
    }

    pub fn detect(&self, image: &[u8]) -> Result<DiseaseReport, InferenceError> {
        let input = prepare_image(image)?;
        let probs = self.model.predict(&input)?;
        let (index, confidence) = argmax(&probs).ok_or(InferenceError::EmptyOutput)?;
        let record = self
            .catalog
            .get(index)
            .ok_or(InferenceError::InvalidOutput {
                index,
                bound: self.catalog.len(),
            })?;

        Ok(DiseaseReport {
            disease: record.label.to_string(),
            confidence: round2(confidence),
            description: record.description.to_string(),
            treatment: record.treatment.to_string(),
        })
    }
}

fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}
