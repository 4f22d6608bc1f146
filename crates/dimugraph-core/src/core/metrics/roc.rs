use crate::core::models::label::ClassLabel;
use std::cmp::Ordering;

/// A receiver operating characteristic curve.
///
/// `thresholds`, `fpr`, and `tpr` are index-aligned; thresholds descend from
/// an infinite sentinel (no node classified as signal) to the lowest
/// observed score (every node classified as signal), so `fpr` and `tpr` are
/// non-decreasing and end at 1 whenever both classes are present.
#[derive(Debug, Clone, PartialEq)]
pub struct RocCurve {
    pub thresholds: Vec<f64>,
    pub fpr: Vec<f64>,
    pub tpr: Vec<f64>,
}

impl RocCurve {
    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }
}

fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Sweeps the ROC curve of signal scores against true labels.
///
/// Signal is the positive class; one point is emitted per distinct score.
/// When either class is absent the curve degenerates to the single starting
/// point `(0, 0)`.
///
/// # Panics
///
/// Panics if `scores` and `labels` differ in length.
pub fn roc_curve(scores: &[f64], labels: &[ClassLabel]) -> RocCurve {
    assert_eq!(scores.len(), labels.len());

    let num_signal = labels.iter().filter(|l| **l == ClassLabel::Signal).count();
    let num_background = labels.len() - num_signal;

    let mut curve = RocCurve {
        thresholds: vec![f64::INFINITY],
        fpr: vec![0.0],
        tpr: vec![0.0],
    };
    if num_signal == 0 || num_background == 0 {
        return curve;
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| descending(scores[a], scores[b]));

    let mut true_positives = 0usize;
    let mut false_positives = 0usize;
    let mut i = 0;
    while i < order.len() {
        let threshold = scores[order[i]];
        // Consume the whole tie group before emitting a point.
        while i < order.len() && scores[order[i]] == threshold {
            match labels[order[i]] {
                ClassLabel::Signal => true_positives += 1,
                ClassLabel::Background => false_positives += 1,
            }
            i += 1;
        }
        curve.thresholds.push(threshold);
        curve.fpr.push(false_positives as f64 / num_background as f64);
        curve.tpr.push(true_positives as f64 / num_signal as f64);
    }
    curve
}

/// Area under the ROC curve via the Wilcoxon–Mann–Whitney rank statistic,
/// with tied scores assigned their average rank.
///
/// Returns 0.5 (chance level) when either class is absent.
///
/// # Panics
///
/// Panics if `scores` and `labels` differ in length.
pub fn auroc(scores: &[f64], labels: &[ClassLabel]) -> f64 {
    assert_eq!(scores.len(), labels.len());

    let num_signal = labels.iter().filter(|l| **l == ClassLabel::Signal).count() as f64;
    let num_background = labels.len() as f64 - num_signal;
    if num_signal == 0.0 || num_background == 0.0 {
        return 0.5;
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].partial_cmp(&scores[b]).unwrap_or(Ordering::Equal));

    // Average ranks over tie groups (ranks are 1-based).
    let mut ranks = vec![0.0f64; order.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j < order.len() && scores[order[j]] == scores[order[i]] {
            j += 1;
        }
        let average_rank = (i + 1 + j) as f64 / 2.0;
        for k in i..j {
            ranks[k] = average_rank;
        }
        i = j;
    }

    let signal_rank_sum: f64 = order
        .iter()
        .enumerate()
        .filter(|&(_, &idx)| labels[idx] == ClassLabel::Signal)
        .map(|(pos, _)| ranks[pos])
        .sum();

    let u = signal_rank_sum - num_signal * (num_signal + 1.0) / 2.0;
    (u / (num_signal * num_background)).clamp(0.0, 1.0)
}

/// Fraction of predicted class indices matching the true labels; 0 for an
/// empty slice.
///
/// # Panics
///
/// Panics if `predictions` and `labels` differ in length.
pub fn accuracy(predictions: &[usize], labels: &[ClassLabel]) -> f64 {
    assert_eq!(predictions.len(), labels.len());
    if labels.is_empty() {
        return 0.0;
    }
    let correct = predictions
        .iter()
        .zip(labels)
        .filter(|&(&p, l)| p == l.index())
        .count();
    correct as f64 / labels.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    const S: ClassLabel = ClassLabel::Signal;
    const B: ClassLabel = ClassLabel::Background;

    #[test]
    fn perfect_separation_scores_unit_area() {
        let scores = [0.9, 0.8, 0.2, 0.1];
        let labels = [S, S, B, B];
        assert!((auroc(&scores, &labels) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn identical_scores_are_chance_level() {
        let scores = [0.5, 0.5, 0.5, 0.5];
        let labels = [S, S, B, B];
        assert!((auroc(&scores, &labels) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn inverted_separation_scores_zero_area() {
        let scores = [0.1, 0.2, 0.8, 0.9];
        let labels = [S, S, B, B];
        assert!(auroc(&scores, &labels) < 1e-12);
    }

    #[test]
    fn ranks_match_the_hand_computed_statistic() {
        // Signal scores {3, 5} against background {1, 2, 4}: U = 5, area 5/6.
        let scores = [3.0, 5.0, 1.0, 2.0, 4.0];
        let labels = [S, S, B, B, B];
        assert!((auroc(&scores, &labels) - 5.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn tied_scores_take_their_average_rank() {
        // Signal {0.5} against background {0.5, 0.3}: one tied pair, area 0.75.
        let scores = [0.5, 0.5, 0.3];
        let labels = [S, B, B];
        assert!((auroc(&scores, &labels) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn missing_classes_fall_back_to_chance() {
        assert_eq!(auroc(&[0.3, 0.9], &[S, S]), 0.5);
        assert_eq!(auroc(&[0.3, 0.9], &[B, B]), 0.5);
        assert_eq!(auroc(&[], &[]), 0.5);
    }

    #[test]
    fn curves_sweep_one_point_per_distinct_score() {
        let scores = [0.9, 0.8, 0.7, 0.3];
        let labels = [S, B, S, B];
        let curve = roc_curve(&scores, &labels);

        assert_eq!(curve.thresholds, vec![f64::INFINITY, 0.9, 0.8, 0.7, 0.3]);
        assert_eq!(curve.fpr, vec![0.0, 0.0, 0.5, 0.5, 1.0]);
        assert_eq!(curve.tpr, vec![0.0, 0.5, 0.5, 1.0, 1.0]);
    }

    #[test]
    fn curves_group_tied_scores_into_one_point() {
        let scores = [0.6, 0.6, 0.2];
        let labels = [S, B, B];
        let curve = roc_curve(&scores, &labels);

        assert_eq!(curve.thresholds, vec![f64::INFINITY, 0.6, 0.2]);
        assert_eq!(curve.fpr, vec![0.0, 0.5, 1.0]);
        assert_eq!(curve.tpr, vec![0.0, 1.0, 1.0]);
    }

    #[test]
    fn rates_are_non_decreasing_and_reach_one() {
        let scores = [0.95, 0.4, 0.35, 0.8, 0.1, 0.6];
        let labels = [S, B, S, S, B, B];
        let curve = roc_curve(&scores, &labels);

        for window in curve.fpr.windows(2) {
            assert!(window[1] >= window[0]);
        }
        for window in curve.tpr.windows(2) {
            assert!(window[1] >= window[0]);
        }
        assert_eq!(*curve.fpr.last().unwrap(), 1.0);
        assert_eq!(*curve.tpr.last().unwrap(), 1.0);
    }

    #[test]
    fn degenerate_curves_hold_only_the_origin() {
        let curve = roc_curve(&[0.4, 0.6], &[S, S]);
        assert_eq!(curve.len(), 1);
        assert_eq!(curve.fpr, vec![0.0]);
    }

    #[test]
    fn accuracy_counts_matching_class_indices() {
        let predictions = [1, 1, 0, 0];
        let labels = [S, B, B, S];
        assert!((accuracy(&predictions, &labels) - 0.5).abs() < 1e-12);
        assert_eq!(accuracy(&[], &[]), 0.0);
    }
}
