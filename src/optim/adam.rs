use crate::math::matrix::Matrix;
use crate::error::Result;
use crate::optim::optimizer::{check_shapes, Optimizer};

/// Adam (Adaptive Moment Estimation).
///
/// Moments are allocated lazily on the first step, one pair per parameter.
#[derive(Debug)]
pub struct Adam {
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    t: u64,
    m: Vec<Matrix>,
    v: Vec<Matrix>,
}

impl Adam {
    pub fn new(beta1: f64, beta2: f64, epsilon: f64) -> Adam {
        Adam {
            beta1,
            beta2,
            epsilon,
            t: 0,
            m: Vec::new(),
            v: Vec::new(),
        }
    }

    /// Number of updates applied so far.
    pub fn steps(&self) -> u64 {
        self.t
    }
}

impl Default for Adam {
    fn default() -> Self {
        Adam::new(0.9, 0.999, 1e-8)
    }
}

impl Optimizer for Adam {
    fn step(&mut self, params: Vec<&mut Matrix>, grads: &[Matrix], learning_rate: f64) -> Result<()> {
        check_shapes(&params, grads)?;
        if self.m.len() != params.len() {
            self.m = params.iter().map(|p| Matrix::zeros(p.rows, p.cols)).collect();
            self.v = self.m.clone();
        }
        self.t += 1;

        // Bias correction folded into the step size.
        let t = self.t as i32;
        let lr_t = learning_rate * (1.0 - self.beta2.powi(t)).sqrt() / (1.0 - self.beta1.powi(t));
        let (beta1, beta2, epsilon) = (self.beta1, self.beta2, self.epsilon);

        for ((param, grad), (m, v)) in params
            .into_iter()
            .zip(grads.iter())
            .zip(self.m.iter_mut().zip(self.v.iter_mut()))
        {
            for i in 0..param.rows {
                for j in 0..param.cols {
                    let g = grad.data[i][j];
                    // m_t = β1·m + (1-β1)·g ; v_t = β2·v + (1-β2)·g²
                    let m_t = beta1 * m.data[i][j] + (1.0 - beta1) * g;
                    let v_t = beta2 * v.data[i][j] + (1.0 - beta2) * g * g;
                    m.data[i][j] = m_t;
                    v.data[i][j] = v_t;
                    param.data[i][j] -= lr_t * m_t / (v_t.sqrt() + epsilon);
                }
            }
        }
        Ok(())
    }
}
