//! Best-class selection over a probability vector.

use serde::Serialize;

use crate::error::{ClassifyError, Result};

/// The winning class of a probability vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    /// Index into the label table.
    pub class_id: usize,
    /// Score of the winning class, in [0, 1] for softmax outputs.
    pub probability: f32,
}

impl Prediction {
    /// Probability expressed as a percentage.
    pub fn percent(&self) -> f32 {
        self.probability * 100.0
    }
}

/// Find the class with the maximal score.
///
/// Scans in index order and keeps the first maximum on ties. NaN scores
/// never replace a numeric maximum.
pub fn best_class(probs: &[f32]) -> Result<Prediction> {
    let (&first, rest) = probs.split_first().ok_or(ClassifyError::EmptyOutput)?;

    let mut best = Prediction {
        class_id: 0,
        probability: first,
    };
    for (offset, &p) in rest.iter().enumerate() {
        if p > best.probability || (best.probability.is_nan() && !p.is_nan()) {
            best = Prediction {
                class_id: offset + 1,
                probability: p,
            };
        }
    }
    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_maximum() {
        let best = best_class(&[0.1, 0.7, 0.2]).unwrap();
        assert_eq!(best.class_id, 1);
        assert_eq!(best.probability, 0.7);
    }

    #[test]
    fn first_maximum_wins_on_tie() {
        let best = best_class(&[0.5, 0.5, 0.3]).unwrap();
        assert_eq!(best.class_id, 0);
        assert_eq!(best.probability, 0.5);
    }

    #[test]
    fn maximum_at_end() {
        let best = best_class(&[0.1, 0.2, 0.3, 0.4]).unwrap();
        assert_eq!(best.class_id, 3);
    }

    #[test]
    fn single_element() {
        let best = best_class(&[0.25]).unwrap();
        assert_eq!(best.class_id, 0);
    }

    #[test]
    fn empty_vector_is_rejected() {
        assert!(matches!(best_class(&[]), Err(ClassifyError::EmptyOutput)));
    }

    #[test]
    fn nan_does_not_win() {
        let best = best_class(&[f32::NAN, 0.2, 0.1]).unwrap();
        assert_eq!(best.class_id, 1);

        let best = best_class(&[0.3, f32::NAN, 0.1]).unwrap();
        assert_eq!(best.class_id, 0);
    }

    #[test]
    fn percent_scales_probability() {
        let p = Prediction {
            class_id: 2,
            probability: 0.5,
        };
        assert_eq!(p.percent(), 50.0);
    }
}
