//! Word-overlap similarity.

use std::collections::HashSet;

use crate::normalize::token_set;

/// Jaccard similarity between two texts' normalized word sets.
///
/// Returns a value in [0.0, 1.0]. Repeated words carry no extra weight.
/// If either text has no words the result is 0.0, even for two empty texts.
pub fn similarity(a: &str, b: &str) -> f64 {
    jaccard(&token_set(a), &token_set(b))
}

/// Jaccard index of two sets; 0.0 when either is empty.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;

    intersection as f64 / union as f64
}
