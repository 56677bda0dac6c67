use ndarray::{Array1, Array2};

use super::error::UnknownSymptomError;
use super::schema::SymptomSchema;

/// One-hot encoding of a symptom selection, in schema order.
///
/// Values are `0.0` or `1.0` so the vector can be handed to the ONNX session
/// as a float tensor without conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Array1<f32>,
}

impl FeatureVector {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &Array1<f32> {
        &self.values
    }

    /// The vector as 0/1 flags, mostly useful for display and tests.
    pub fn to_bits(&self) -> Vec<u8> {
        self.values.iter().map(|&v| if v > 0.5 { 1 } else { 0 }).collect()
    }

    /// Indices of the set features, ascending.
    pub fn active_positions(&self) -> Vec<usize> {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, &v)| v > 0.5)
            .map(|(i, _)| i)
            .collect()
    }

    /// Reshapes into a single-row batch `[1, N]`.
    pub(crate) fn to_batch(&self) -> Array2<f32> {
        self.values.clone().insert_axis(ndarray::Axis(0))
    }
}

/// Encodes selected symptom names into a [`FeatureVector`] matching `schema`.
///
/// Fails on the first name that is not in the schema; no partial vector is
/// returned. The result does not depend on the order of `selected`.
pub fn encode<I, S>(selected: I, schema: &SymptomSchema) -> Result<FeatureVector, UnknownSymptomError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut values = Array1::<f32>::zeros(schema.len());
    for symptom in selected {
        let symptom = symptom.as_ref();
        let position = schema.position(symptom).ok_or_else(|| UnknownSymptomError {
            symptom: symptom.to_string(),
        })?;
        values[position] = 1.0;
    }
    Ok(FeatureVector { values })
}
