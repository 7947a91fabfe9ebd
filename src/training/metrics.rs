//! Classification metrics for holdout evaluation

use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Holdout metrics computed from probabilities and a cutoff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalMetrics {
    pub auc: f64,
    pub f1: f64,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub n_samples: usize,
}

impl EvalMetrics {
    /// Compute AUC plus the cutoff-dependent metrics.
    ///
    /// Predictions use a non-strict comparison: `prob >= cutoff` counts as
    /// the positive class.
    pub fn compute(y_true: &Array1<f64>, y_prob: &Array1<f64>, cutoff: f64) -> Self {
        let n = y_true.len();

        let (mut tp, mut fp, mut tn, mut fn_) = (0usize, 0usize, 0usize, 0usize);
        for (t, p) in y_true.iter().zip(y_prob.iter()) {
            let actual = *t > 0.5;
            let predicted = *p >= cutoff;
            match (actual, predicted) {
                (true, true) => tp += 1,
                (false, true) => fp += 1,
                (false, false) => tn += 1,
                (true, false) => fn_ += 1,
            }
        }

        let accuracy = if n > 0 {
            (tp + tn) as f64 / n as f64
        } else {
            0.0
        };
        let precision = if tp + fp > 0 {
            tp as f64 / (tp + fp) as f64
        } else {
            0.0
        };
        let recall = if tp + fn_ > 0 {
            tp as f64 / (tp + fn_) as f64
        } else {
            0.0
        };
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        Self {
            auc: roc_auc(y_true, y_prob),
            f1,
            accuracy,
            precision,
            recall,
            n_samples: n,
        }
    }
}

/// Area under the ROC curve via the rank-sum statistic, with ties sharing
/// their average rank. Degenerate single-class inputs score 0.5.
pub fn roc_auc(y_true: &Array1<f64>, y_prob: &Array1<f64>) -> f64 {
    let n = y_true.len();
    if n == 0 {
        return 0.5;
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        y_prob[a]
            .partial_cmp(&y_prob[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut ranks = vec![0.0f64; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && y_prob[order[j + 1]] == y_prob[order[i]] {
            j += 1;
        }
        // 1-based average rank of the tie group
        let avg = (i + j) as f64 / 2.0 + 1.0;
        for k in i..=j {
            ranks[order[k]] = avg;
        }
        i = j + 1;
    }

    let n_pos = y_true.iter().filter(|&&t| t > 0.5).count();
    let n_neg = n - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return 0.5;
    }

    let rank_sum_pos: f64 = y_true
        .iter()
        .zip(ranks.iter())
        .filter(|(t, _)| **t > 0.5)
        .map(|(_, r)| *r)
        .sum();

    (rank_sum_pos - (n_pos * (n_pos + 1)) as f64 / 2.0) / (n_pos * n_neg) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_perfect_ranking_has_auc_one() {
        let y = array![0.0, 0.0, 1.0, 1.0];
        let p = array![0.1, 0.2, 0.8, 0.9];
        assert_eq!(roc_auc(&y, &p), 1.0);
    }

    #[test]
    fn test_inverted_ranking_has_auc_zero() {
        let y = array![1.0, 1.0, 0.0, 0.0];
        let p = array![0.1, 0.2, 0.8, 0.9];
        assert_eq!(roc_auc(&y, &p), 0.0);
    }

    #[test]
    fn test_all_ties_score_half() {
        let y = array![0.0, 1.0, 0.0, 1.0];
        let p = array![0.5, 0.5, 0.5, 0.5];
        assert!((roc_auc(&y, &p) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_single_class_scores_half() {
        let y = array![1.0, 1.0];
        let p = array![0.3, 0.9];
        assert_eq!(roc_auc(&y, &p), 0.5);
    }

    #[test]
    fn test_compute_at_cutoff() {
        let y = array![1.0, 0.0, 1.0, 0.0];
        let p = array![0.9, 0.6, 0.5, 0.1];

        let m = EvalMetrics::compute(&y, &p, 0.5);
        // Cutoff is non-strict, so 0.5 predicts positive: tp=2, fp=1, fn=0.
        assert_eq!(m.n_samples, 4);
        assert!((m.recall - 1.0).abs() < 1e-12);
        assert!((m.precision - 2.0 / 3.0).abs() < 1e-12);
        assert!((m.f1 - 0.8).abs() < 1e-12);
        assert!((m.accuracy - 0.75).abs() < 1e-12);
    }
}
