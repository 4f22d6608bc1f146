use nalgebra::DMatrix;

/// Adam optimizer over a fixed list of parameter matrices.
///
/// Moment estimates are kept per parameter slot and allocated lazily on the
/// first step, so the caller must pass parameters in the same order on every
/// call. Weight decay is folded into the gradient before the moment updates.
#[derive(Debug, Clone)]
pub struct Adam {
    learning_rate: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    weight_decay: f64,
    steps: usize,
    first_moments: Vec<DMatrix<f64>>,
    second_moments: Vec<DMatrix<f64>>,
}

impl Adam {
    pub fn new(learning_rate: f64, weight_decay: f64) -> Self {
        Self {
            learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            weight_decay,
            steps: 0,
            first_moments: Vec::new(),
            second_moments: Vec::new(),
        }
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// Applies one bias-corrected update to every parameter slot.
    ///
    /// # Panics
    ///
    /// Panics if `parameters` and `gradients` differ in length, or if the
    /// slot layout changes between calls.
    pub fn step(&mut self, parameters: &mut [&mut DMatrix<f64>], gradients: &[DMatrix<f64>]) {
        assert_eq!(
            parameters.len(),
            gradients.len(),
            "every parameter needs exactly one gradient"
        );
        if self.first_moments.is_empty() {
            self.first_moments = gradients
                .iter()
                .map(|g| DMatrix::zeros(g.nrows(), g.ncols()))
                .collect();
            self.second_moments = self.first_moments.clone();
        }
        assert_eq!(self.first_moments.len(), parameters.len());

        self.steps += 1;
        let bias1 = 1.0 - self.beta1.powi(self.steps as i32);
        let bias2 = 1.0 - self.beta2.powi(self.steps as i32);

        for (slot, (param, grad)) in parameters.iter_mut().zip(gradients).enumerate() {
            let m = &mut self.first_moments[slot];
            let v = &mut self.second_moments[slot];
            debug_assert_eq!(param.shape(), grad.shape());
            debug_assert_eq!(param.shape(), m.shape());

            for (i, g) in grad.iter().enumerate() {
                let g = g + self.weight_decay * param[i];
                m[i] = self.beta1 * m[i] + (1.0 - self.beta1) * g;
                v[i] = self.beta2 * v[i] + (1.0 - self.beta2) * g * g;
                let m_hat = m[i] / bias1;
                let v_hat = v[i] / bias2;
                param[i] -= self.learning_rate * m_hat / (v_hat.sqrt() + self.epsilon);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_step_moves_by_roughly_the_learning_rate() {
        let mut optimizer = Adam::new(0.1, 0.0);
        let mut param = DMatrix::from_element(1, 1, 1.0);
        let grad = DMatrix::from_element(1, 1, 0.5);

        optimizer.step(&mut [&mut param], &[grad]);
        // Bias correction makes the first update lr * g / (|g| + eps).
        assert!((param[(0, 0)] - 0.9).abs() < 1e-6);
    }

    #[test]
    fn weight_decay_shrinks_parameters_without_a_gradient() {
        let mut optimizer = Adam::new(0.01, 0.1);
        let mut param = DMatrix::from_element(1, 2, 1.0);
        let grad = DMatrix::zeros(1, 2);

        optimizer.step(&mut [&mut param], &[grad.clone()]);
        assert!(param[(0, 0)] < 1.0);
        assert!(param[(0, 1)] < 1.0);
    }

    #[test]
    fn constant_gradients_keep_descending() {
        let mut optimizer = Adam::new(0.05, 0.0);
        let mut param = DMatrix::from_element(2, 2, 1.0);
        let mut previous = param[(0, 0)];

        for _ in 0..5 {
            let grad = DMatrix::from_element(2, 2, 1.0);
            optimizer.step(&mut [&mut param], &[grad]);
            assert!(param[(0, 0)] < previous);
            previous = param[(0, 0)];
        }
    }
}
