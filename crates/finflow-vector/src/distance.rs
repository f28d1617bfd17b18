//! Vector distance math
//!
//! Cosine distance is the only metric the index exposes; lower is closer,
//! range `[0, 2]`.

/// Euclidean magnitude of a vector
#[must_use]
pub fn magnitude(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Cosine similarity between two equal-length vectors
///
/// Zero-magnitude vectors yield similarity 0.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let ma = magnitude(a);
    let mb = magnitude(b);

    if ma == 0.0 || mb == 0.0 {
        return 0.0;
    }
    dot / (ma * mb)
}

/// Cosine distance: `1 - similarity`, ascending means closer first
#[inline]
#[must_use]
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    1.0 - cosine_similarity(a, b)
}
