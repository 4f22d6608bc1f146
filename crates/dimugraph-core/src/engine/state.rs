use crate::core::io::artifacts::EpochRecord;

/// Accumulated record of one training run, epoch by epoch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingHistory {
    epochs: Vec<EpochRecord>,
}

impl TrainingHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, epoch: usize, loss: f64, val_accuracy: Option<f64>) {
        self.epochs.push(EpochRecord {
            epoch,
            loss,
            val_accuracy,
        });
    }

    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    pub fn epochs(&self) -> &[EpochRecord] {
        &self.epochs
    }

    /// Training loss of the last recorded epoch.
    pub fn final_loss(&self) -> Option<f64> {
        self.epochs.last().map(|e| e.loss)
    }

    /// The epoch with the best validation accuracy, if any was measured.
    pub fn best_validation(&self) -> Option<(usize, f64)> {
        self.epochs
            .iter()
            .filter_map(|e| e.val_accuracy.map(|acc| (e.epoch, acc)))
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
    }
}
