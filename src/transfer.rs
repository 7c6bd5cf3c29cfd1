//! Transfer (activation) function types.

use itertools::izip;
use ndarray::Array1;

/// [Activation function](https://en.wikipedia.org/wiki/Activation_function)
/// types.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TransferFunction {
    /// `slope * x`
    Linear { slope: f64 },
    /// `slope * x`, clamped to `[lower_bound, upper_bound]`.
    ///
    /// The derivative is zero wherever the output is clamped.
    ClippedLinear {
        slope: f64,
        lower_bound: f64,
        upper_bound: f64,
    },
    /// Logistic sigmoid
    Logistic,
    /// Hyperbolic tan function
    TanH,
    /// Rectified Linear Unit
    ReLU,
    /// Leaky Rectified Linear Unit
    ///
    /// Takes an `alpha` value to use for negative inputs.
    LeakyReLU(f64),
}

impl Default for TransferFunction {
    fn default() -> Self {
        TransferFunction::linear()
    }
}

impl TransferFunction {
    /// The identity function.
    pub fn linear() -> Self {
        TransferFunction::Linear { slope: 1.0 }
    }

    /// Evaluates `f(x)` for the selected transfer function.
    pub fn f(&self, x: f64) -> f64 {
        use self::TransferFunction::*;
        match *self {
            Linear { slope } => slope * x,
            ClippedLinear {
                slope,
                lower_bound,
                upper_bound,
            } => (slope * x).max(lower_bound).min(upper_bound),
            Logistic => {
                // Split on the sign so exp() never overflows.
                if x >= 0.0 {
                    1.0 / (1.0 + (-x).exp())
                } else {
                    let e = x.exp();
                    e / (1.0 + e)
                }
            }
            TanH => x.tanh(),
            ReLU => {
                if x > 0.0 {
                    x
                } else {
                    0.0
                }
            }
            LeakyReLU(alpha) => {
                if x > 0.0 {
                    x
                } else {
                    alpha * x
                }
            }
        }
    }

    /// Evaluates the derivative `f'(x)`, given both the net input `x` and the
    /// already computed output `y = f(x)`.
    ///
    /// Sigmoidal derivatives are computed from the output, which keeps them
    /// bounded even when `x` is very large.
    pub fn derivative(&self, x: f64, y: f64) -> f64 {
        use self::TransferFunction::*;
        match *self {
            Linear { slope } => slope,
            ClippedLinear {
                slope,
                lower_bound,
                upper_bound,
            } => {
                if y <= lower_bound || y >= upper_bound {
                    0.0
                } else {
                    slope
                }
            }
            Logistic => y * (1.0 - y),
            TanH => 1.0 - y * y,
            ReLU => {
                if x > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            LeakyReLU(alpha) => {
                if x > 0.0 {
                    1.0
                } else {
                    alpha
                }
            }
        }
    }

    /// Applies the function elementwise to `net_input`, writing activations
    /// and derivatives in a single pass.
    pub fn apply_function_and_derivative(
        &self,
        net_input: &Array1<f64>,
        activations: &mut Array1<f64>,
        derivatives: &mut Array1<f64>,
    ) {
        assert_eq!(net_input.len(), activations.len());
        assert_eq!(net_input.len(), derivatives.len());
        for (&x, y, d) in izip!(
            net_input.iter(),
            activations.iter_mut(),
            derivatives.iter_mut()
        ) {
            *y = self.f(x);
            *d = self.derivative(x, *y);
        }
    }
}
