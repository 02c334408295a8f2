//! Combines chunk embeddings into one unit-length document vector.

use ndarray::{Array1, ArrayView1};

use crate::error::AggregateError;
use crate::models::EmbeddingResult;

/// Norms at or below this are treated as degenerate.
pub const MIN_NORM: f64 = 1e-12;

/// One chunk's vector and the number of tokens it covered.
#[derive(Debug, Clone, Copy)]
pub struct WeightedVector<'a> {
    pub vector: &'a [f64],
    pub weight: usize,
}

impl<'a> WeightedVector<'a> {
    pub fn new(vector: &'a [f64], weight: usize) -> Self {
        Self { vector, weight }
    }
}

/// Token-weighted mean of chunk vectors, scaled to unit L2 norm.
///
/// Weights are turned into fractions of the total before accumulating, so
/// a single chunk carries weight exactly `1.0` and the fast path below is
/// bit-identical to the general one. `total_tokens` is passed through as
/// the service-reported usage for the whole document.
pub fn aggregate(
    chunks: &[WeightedVector<'_>],
    total_tokens: u64,
) -> Result<EmbeddingResult, AggregateError> {
    let first = chunks.first().ok_or(AggregateError::Empty)?;
    let dimension = first.vector.len();

    for (index, chunk) in chunks.iter().enumerate() {
        if chunk.vector.len() != dimension {
            return Err(AggregateError::DimensionMismatch {
                index,
                expected: dimension,
                actual: chunk.vector.len(),
            });
        }
    }

    let total_weight: usize = chunks.iter().map(|c| c.weight).sum();
    if total_weight == 0 {
        return Err(AggregateError::ZeroWeight);
    }

    let mean = if chunks.len() == 1 {
        Array1::from(first.vector.to_vec())
    } else {
        weighted_mean(chunks, total_weight as f64)
    };

    let vector = normalize(mean)?;
    Ok(EmbeddingResult {
        vector,
        total_tokens,
    })
}

fn weighted_mean(chunks: &[WeightedVector<'_>], total_weight: f64) -> Array1<f64> {
    let mut iter = chunks.iter();
    let mut acc = match iter.next() {
        Some(first) => &ArrayView1::from(first.vector) * (first.weight as f64 / total_weight),
        None => return Array1::zeros(0),
    };
    for chunk in iter {
        let fraction = chunk.weight as f64 / total_weight;
        acc.scaled_add(fraction, &ArrayView1::from(chunk.vector));
    }
    acc
}

/// Divide a vector by its own L2 norm.
pub fn normalize(vector: Array1<f64>) -> Result<Vec<f64>, AggregateError> {
    let norm = vector.dot(&vector).sqrt();
    if !norm.is_finite() || norm <= MIN_NORM {
        return Err(AggregateError::DegenerateVector { norm });
    }
    Ok((vector / norm).to_vec())
}
