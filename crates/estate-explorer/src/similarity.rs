//! Weighted similarity recommender over the three precomputed matrices.

use std::cmp::Ordering;

use ndarray::Zip;

use crate::index::PropertyIndex;
use crate::tables::SimilarityMatrices;
use crate::types::{EstateResult, Recommendation, SimilarityWeights};

/// Combined score of every property against the one at `position`.
pub fn combined_scores(
    matrices: &SimilarityMatrices,
    position: usize,
    weights: &SimilarityWeights,
) -> Vec<f64> {
    Zip::from(matrices.by_name.row(position))
        .and(matrices.by_location.row(position))
        .and(matrices.by_facilities.row(position))
        .map_collect(|&n, &l, &f| weights.combine(n, l, f))
        .to_vec()
}

/// Top-`top_n` properties most similar to `property`, best first.
///
/// The query property itself never appears. Equal scores keep canonical
/// index order.
pub fn recommend_similar(
    index: &PropertyIndex,
    matrices: &SimilarityMatrices,
    property: &str,
    top_n: usize,
    weights: &SimilarityWeights,
) -> EstateResult<Vec<Recommendation>> {
    weights.validate()?;
    let position = index.resolve(property)?;
    if top_n == 0 {
        return Ok(Vec::new());
    }

    let scores = combined_scores(matrices, position, weights);
    let mut ranked: Vec<(usize, f64)> = scores
        .into_iter()
        .enumerate()
        .filter(|(i, _)| *i != position)
        .collect();

    ranked.sort_by(|a, b| match b.1.total_cmp(&a.1) {
        Ordering::Equal => a.0.cmp(&b.0),
        other => other,
    });
    ranked.truncate(top_n);

    tracing::debug!("Recommendations for '{property}': {} results", ranked.len());
    Ok(ranked
        .into_iter()
        .map(|(i, score)| Recommendation {
            property: index.name(i).to_string(),
            score,
        })
        .collect())
}
