use super::encoder::FeatureVector;
use super::error::PredictionError;
use super::model::ClassifierModel;

/// Number of candidates shown for a prediction.
pub const DEFAULT_TOP_K: usize = 3;

/// Scores `features` and returns the `k` most probable classes, best first.
///
/// Exact ties keep the classifier's class order: the class listed first in
/// `model.classes()` ranks higher. Probabilities are passed through as the
/// model reports them. Returns `min(k, classes)` entries.
pub fn rank_top_k<M>(model: &M, features: &FeatureVector, k: usize) -> Result<Vec<(String, f32)>, PredictionError>
where
    M: ClassifierModel + ?Sized,
{
    let classes = model.classes();
    let probabilities = model.predict_proba(features)?;
    if probabilities.len() != classes.len() {
        return Err(PredictionError::ProbabilityCount {
            classes: classes.len(),
            probabilities: probabilities.len(),
        });
    }

    let mut order: Vec<usize> = (0..probabilities.len()).collect();
    // Stable sort, so equal probabilities stay in class order
    order.sort_by(|&a, &b| probabilities[b].total_cmp(&probabilities[a]));

    Ok(order
        .into_iter()
        .take(k)
        .map(|i| (classes[i].clone(), probabilities[i]))
        .collect())
}
