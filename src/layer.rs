use crate::transfer::TransferFunction;

use ndarray::linalg::general_mat_vec_mul;
use ndarray::{Array, Array1, Array2, ArrayView1, Dimension};

/// The array state for a single non-input layer of a shadow network,
/// together with the weights feeding into it.
///
/// Weights are stored with one row per neuron of this layer and one column
/// per neuron of the previous layer.
#[derive(Clone, Debug)]
pub struct Layer {
    /// The transfer function shared by every neuron in the layer.
    transfer: TransferFunction,
    weights: Array2<f64>,
    biases: Array1<f64>,
    net_inputs: Array1<f64>,
    activations: Array1<f64>,
    derivatives: Array1<f64>,
    /// Error times derivative for each neuron.
    deltas: Array1<f64>,
    /// Gradients summed over the rows of the current batch.
    weight_gradient: Array2<f64>,
    bias_gradient: Array1<f64>,
    /// The last applied updates, for momentum.
    last_weight_updates: Array2<f64>,
    last_bias_updates: Array1<f64>,
}

impl Layer {
    /// Initializes a layer from existing weights and biases.
    ///
    /// Arguments:
    ///
    ///  * `transfer` - the transfer function to be used for this layer's
    ///                 output.
    ///  * `weights` - a `outputs x inputs` weight matrix.
    ///  * `biases` - one bias per output.
    pub fn new(transfer: TransferFunction, weights: Array2<f64>, biases: Array1<f64>) -> Self {
        assert_eq!(weights.nrows(), biases.len());
        let (outputs, inputs) = weights.dim();
        Layer {
            transfer,
            weights,
            biases,
            net_inputs: Array1::zeros(outputs),
            activations: Array1::zeros(outputs),
            derivatives: Array1::zeros(outputs),
            deltas: Array1::zeros(outputs),
            weight_gradient: Array2::zeros((outputs, inputs)),
            bias_gradient: Array1::zeros(outputs),
            last_weight_updates: Array2::zeros((outputs, inputs)),
            last_bias_updates: Array1::zeros(outputs),
        }
    }

    /// Returns the number of inputs to this layer.
    pub fn input_len(&self) -> usize {
        self.weights.ncols()
    }

    /// Returns the number of neurons in this layer.
    pub fn output_len(&self) -> usize {
        self.weights.nrows()
    }

    pub fn transfer(&self) -> TransferFunction {
        self.transfer
    }

    pub fn weights(&self) -> &Array2<f64> {
        &self.weights
    }

    pub fn biases(&self) -> &Array1<f64> {
        &self.biases
    }

    pub fn net_inputs(&self) -> &Array1<f64> {
        &self.net_inputs
    }

    pub fn activations(&self) -> &Array1<f64> {
        &self.activations
    }

    pub fn derivatives(&self) -> &Array1<f64> {
        &self.derivatives
    }

    pub fn deltas(&self) -> &Array1<f64> {
        &self.deltas
    }

    pub fn last_weight_updates(&self) -> &Array2<f64> {
        &self.last_weight_updates
    }

    pub fn last_bias_updates(&self) -> &Array1<f64> {
        &self.last_bias_updates
    }

    pub(crate) fn weights_mut(&mut self) -> &mut Array2<f64> {
        &mut self.weights
    }

    pub(crate) fn biases_mut(&mut self) -> &mut Array1<f64> {
        &mut self.biases
    }

    /// Feeds the provided `inputs` forward through the layer, filling in net
    /// inputs, activations and derivatives.
    pub fn forward(&mut self, inputs: ArrayView1<f64>) {
        assert_eq!(inputs.len(), self.input_len());
        self.net_inputs.assign(&self.biases);
        general_mat_vec_mul(1.0, &self.weights, &inputs, 1.0, &mut self.net_inputs);
        self.transfer.apply_function_and_derivative(
            &self.net_inputs,
            &mut self.activations,
            &mut self.derivatives,
        );
    }

    /// Names the first quantity from the last forward pass that is not
    /// finite, if any.
    pub(crate) fn non_finite_state(&self) -> Option<&'static str> {
        if !all_finite(&self.net_inputs) {
            Some("net input")
        } else if !all_finite(&self.activations) {
            Some("activation")
        } else if !all_finite(&self.derivatives) {
            Some("derivative")
        } else {
            None
        }
    }

    pub(crate) fn deltas_finite(&self) -> bool {
        all_finite(&self.deltas)
    }

    /// Returns true while every accumulated gradient is finite.
    pub(crate) fn gradient_finite(&self) -> bool {
        all_finite(&self.weight_gradient) && all_finite(&self.bias_gradient)
    }

    /// Sets the output deltas from `errors` (target minus output), scaled by
    /// this layer's derivatives.
    pub fn set_output_errors(&mut self, errors: &Array1<f64>) {
        assert_eq!(errors.len(), self.output_len());
        self.deltas.assign(errors);
        self.deltas *= &self.derivatives;
    }

    /// Sets the deltas to `errors` unscaled, as the delta rule does.
    pub fn set_raw_errors(&mut self, errors: &Array1<f64>) {
        assert_eq!(errors.len(), self.output_len());
        self.deltas.assign(errors);
    }

    /// Feeds this layer's deltas backwards through its weights into the
    /// deltas of `previous`.
    pub fn backpropagate_into(&self, previous: &mut Layer) {
        assert_eq!(previous.output_len(), self.input_len());
        general_mat_vec_mul(1.0, &self.weights.t(), &self.deltas, 0.0, &mut previous.deltas);
        previous.deltas *= &previous.derivatives;
    }

    /// Adds the gradient for the current deltas to the batch accumulators.
    /// `inputs` are the activations that fed this layer.
    pub fn accumulate_gradient(&mut self, inputs: ArrayView1<f64>) {
        assert_eq!(inputs.len(), self.input_len());
        let rows = self.weight_gradient.rows_mut().into_iter();
        for (mut row, &delta) in rows.zip(self.deltas.iter()) {
            row.scaled_add(delta, &inputs);
        }
        self.bias_gradient += &self.deltas;
    }

    /// Applies and resets the accumulated gradient.
    ///
    /// Each parameter moves by `rate * scale * gradient + momentum * last
    /// update`, and that step becomes the new last update. `scale` averages
    /// a multi-row batch.
    pub fn apply_update(&mut self, rate: f64, momentum: f64, scale: f64) {
        let step = rate * scale;

        self.last_weight_updates *= momentum;
        self.last_weight_updates.scaled_add(step, &self.weight_gradient);
        self.weights += &self.last_weight_updates;

        self.last_bias_updates *= momentum;
        self.last_bias_updates.scaled_add(step, &self.bias_gradient);
        self.biases += &self.last_bias_updates;

        self.clear_gradient();
    }

    pub fn clear_gradient(&mut self) {
        self.weight_gradient.fill(0.0);
        self.bias_gradient.fill(0.0);
    }
}

fn all_finite<D: Dimension>(values: &Array<f64, D>) -> bool {
    values.iter().all(|x| x.is_finite())
}
