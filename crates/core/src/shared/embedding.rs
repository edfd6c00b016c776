use std::sync::Arc;

/// Fixed-length face descriptor produced by an embedding extractor.
///
/// Immutable once created; clones share the underlying buffer so storing
/// a reference in the registry never copies the vector.
#[derive(Clone, Debug, PartialEq)]
pub struct Embedding {
    values: Arc<[f32]>,
}

impl Embedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self {
            values: values.into(),
        }
    }

    /// Builds an embedding scaled to unit L2 norm. A zero vector stays zero.
    pub fn normalized(mut values: Vec<f32>) -> Self {
        l2_normalize(&mut values);
        Self::new(values)
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn dim(&self) -> usize {
        self.values.len()
    }

    /// Euclidean distance. Descriptors of different dimensionality never
    /// match, so their distance is infinite.
    pub fn distance(&self, other: &Embedding) -> f64 {
        if self.dim() != other.dim() {
            return f64::INFINITY;
        }
        self.values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| {
                let d = *a as f64 - *b as f64;
                d * d
            })
            .sum::<f64>()
            .sqrt()
    }
}

/// Two faces match iff their distance is strictly below `threshold`.
pub fn matches(a: &Embedding, b: &Embedding, threshold: f64) -> bool {
    a.distance(b) < threshold
}

pub fn l2_normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}
