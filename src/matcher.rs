//! Nearest-neighbour matching of signal vectors.
//!
//! A device is placed at the measurement whose recorded signal vector is
//! closest, by Euclidean distance, to the signal vector the device reported.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    #[error("there are no measurements to match against")]
    NoCandidates,
    #[error("measurement #{index} has {found} readings but {expected} were given")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },
    #[error("signal readings must be finite numbers")]
    NonFinite,
}

/// Closest candidate found by [`nearest`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nearest {
    pub index: usize,
    pub distance: f64,
}

/// Euclidean distance between two vectors of equal length.
pub fn distance(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

/// Finds the candidate closest to `query`.
///
/// Equidistant candidates resolve to the lowest index. Every candidate must
/// have the same length as `query`, otherwise the distance would be computed
/// over a truncated vector and mean nothing.
pub fn nearest<C>(query: &[f64], candidates: &[C]) -> Result<Nearest, MatchError>
where
    C: AsRef<[f64]>,
{
    if candidates.is_empty() {
        return Err(MatchError::NoCandidates);
    }
    if !query.iter().all(|x| x.is_finite()) {
        return Err(MatchError::NonFinite);
    }

    let mut best: Option<Nearest> = None;
    for (index, candidate) in candidates.iter().enumerate() {
        let candidate = candidate.as_ref();
        if candidate.len() != query.len() {
            return Err(MatchError::DimensionMismatch {
                index,
                expected: query.len(),
                found: candidate.len(),
            });
        }
        if !candidate.iter().all(|x| x.is_finite()) {
            return Err(MatchError::NonFinite);
        }

        let distance = distance(query, candidate);
        if best.map_or(true, |b| distance < b.distance) {
            best = Some(Nearest { index, distance });
        }
    }

    best.ok_or(MatchError::NoCandidates)
}
