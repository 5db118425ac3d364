pub mod crop;
pub mod disease;
pub mod model;
pub mod preprocess;

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("image decoding failed: {0}")]
    Decode(#[from] image::ImageError),
    #[error("model execution failed: {0}")]
    Model(#[from] tch::TchError),
    #[error("input tensor layout error: {0}")]
    Shape(String),
    #[error("class index {index} outside {bound}-entry label set")]
    InvalidOutput { index: usize, bound: usize },
    #[error("label file error: {0}")]
    Labels(String),
    #[error("model produced an empty output vector")]
    EmptyOutput,
}

/// Index and value of the largest entry. Ties keep the lowest index.
pub fn argmax(values: &[f32]) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v > b => best = Some((i, v)),
            None => best = Some((i, v)),
            _ => {}
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_picks_largest() {
        assert_eq!(argmax(&[0.1, 0.7, 0.2]), Some((1, 0.7)));
    }

    #[test]
    fn argmax_breaks_ties_toward_lowest_index() {
        assert_eq!(argmax(&[0.4, 0.4, 0.2]), Some((0, 0.4)));
    }

    #[test]
    fn argmax_of_empty_is_none() {
        assert_eq!(argmax(&[]), None);
    }
}
