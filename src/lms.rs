//! Least mean squares training (the delta rule) for one connection between
//! an input layer and an output layer.

use crate::dataset::TrainingSet;
use crate::error::{Result, TrainingError};
use crate::layer::Layer;
use crate::randomizer::{self, WeightInit};
use crate::topology::{CommitTarget, NetworkTopology};
use crate::trainer::IterableTrainer;

use log::{debug, trace};
use ndarray::Array1;
use rand::Rng;

/// Default learning rate.
pub const DEFAULT_LEARNING_RATE: f64 = 0.01;

/// Settings for an `LmsTrainer`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LmsConfig {
    pub learning_rate: f64,
    pub weight_init: WeightInit,
}

impl Default for LmsConfig {
    fn default() -> Self {
        LmsConfig {
            learning_rate: DEFAULT_LEARNING_RATE,
            weight_init: WeightInit::default(),
        }
    }
}

impl LmsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the learning rate.
    pub fn learning_rate(mut self, rate: f64) -> Self {
        self.learning_rate = rate;
        self
    }

    /// Sets the distribution weights are drawn from when randomizing.
    pub fn weight_init(mut self, init: WeightInit) -> Self {
        self.weight_init = init;
        self
    }

    /// Builds a trainer for the connection from layer `inputs` to layer
    /// `outputs` of `topology`.
    pub fn build(
        self,
        topology: &NetworkTopology,
        inputs: usize,
        outputs: usize,
        training_set: TrainingSet,
    ) -> Result<LmsTrainer> {
        if !self.learning_rate.is_finite() || self.learning_rate < 0.0 {
            return Err(TrainingError::InvalidParameter {
                name: "learning rate",
                value: self.learning_rate,
            });
        }
        self.weight_init.validate()?;
        let connection = topology
            .find_connection(inputs, outputs)
            .ok_or(TrainingError::MissingConnection {
                from: inputs,
                to: outputs,
            })?;
        let input_len = topology.layer(inputs)?.len();
        let output_layer = topology.layer(outputs)?;
        if input_len == 0 {
            return Err(TrainingError::EmptyLayer(inputs));
        }
        if output_layer.is_empty() {
            return Err(TrainingError::EmptyLayer(outputs));
        }
        training_set.validate(input_len, output_layer.len())?;

        let weights = topology.connection(connection)?.strengths().t().to_owned();
        let biases = Array1::from(output_layer.biases().to_vec());
        debug!(
            "Built LMS trainer: {} inputs, {} outputs",
            input_len,
            output_layer.len()
        );
        Ok(LmsTrainer {
            input_layer: inputs,
            output_layer: outputs,
            connection,
            input: Array1::zeros(input_len),
            errors: Array1::zeros(output_layer.len()),
            layer: Layer::new(output_layer.transfer(), weights, biases),
            training_set,
            config: self,
            iteration: 0,
            mse: 0.0,
        })
    }
}

/// Trains a single layer of weights and the output biases with the delta
/// rule, updating after every row.
#[derive(Clone, Debug)]
pub struct LmsTrainer {
    input_layer: usize,
    output_layer: usize,
    connection: usize,
    input: Array1<f64>,
    errors: Array1<f64>,
    layer: Layer,
    training_set: TrainingSet,
    config: LmsConfig,
    iteration: usize,
    mse: f64,
}

impl LmsTrainer {
    pub fn learning_rate(&self) -> f64 {
        self.config.learning_rate
    }

    /// Returns the trained output layer.
    pub fn layer(&self) -> &Layer {
        &self.layer
    }

    /// Replaces the training data, checking it against the layer sizes.
    pub fn set_training_set(&mut self, training_set: TrainingSet) -> Result<()> {
        training_set.validate(self.layer.input_len(), self.layer.output_len())?;
        self.training_set = training_set;
        Ok(())
    }
}

impl IterableTrainer for LmsTrainer {
    /// Runs through every row of the training set once, in order.
    fn apply<R: Rng + ?Sized>(&mut self, _: &mut R) -> Result<f64> {
        let (inputs, targets) = self.training_set.data()?;
        let rate = self.config.learning_rate;

        let mut error = 0.0;
        for (input, target) in inputs.rows().into_iter().zip(targets.rows()) {
            self.input.assign(&input);
            self.layer.forward(self.input.view());
            if let Some(quantity) = self.layer.non_finite_state() {
                return Err(TrainingError::NonFinite {
                    layer: self.output_layer,
                    quantity,
                });
            }
            self.errors.assign(&target);
            self.errors -= self.layer.activations();
            let row_error = self.errors.dot(&self.errors);
            if !row_error.is_finite() {
                return Err(TrainingError::NonFinite {
                    layer: self.output_layer,
                    quantity: "error",
                });
            }
            error += row_error;

            self.layer.set_raw_errors(&self.errors);
            self.layer.accumulate_gradient(self.input.view());
            if !self.layer.gradient_finite() {
                self.layer.clear_gradient();
                return Err(TrainingError::NonFinite {
                    layer: self.output_layer,
                    quantity: "gradient",
                });
            }
            self.layer.apply_update(rate, 0.0, 1.0);
        }
        self.mse = error / (inputs.nrows() * self.layer.output_len()) as f64;
        self.iteration += 1;
        trace!("Iteration {}: MSE={}", self.iteration, self.mse);
        Ok(self.mse)
    }

    fn error(&self) -> f64 {
        self.mse
    }

    fn iteration(&self) -> usize {
        self.iteration
    }

    /// Redraws the weights from the configured distribution and the output
    /// biases uniformly from `[0, 1)`.
    fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<()> {
        self.config.weight_init.fill(self.layer.weights_mut(), rng)?;
        randomizer::fill_uniform(self.layer.biases_mut(), 0.0, 1.0, rng);
        Ok(())
    }

    fn commit_changes(&self, target: &mut dyn CommitTarget) {
        for (unit, (&activation, &bias)) in self
            .layer
            .activations()
            .iter()
            .zip(self.layer.biases())
            .enumerate()
        {
            target.force_set_activation(self.output_layer, unit, activation);
            target.set_bias(self.output_layer, unit, bias);
        }
        for (unit, &activation) in self.input.iter().enumerate() {
            target.force_set_activation(self.input_layer, unit, activation);
        }
        for ((unit, source), &strength) in self.layer.weights().indexed_iter() {
            target.force_set_strength(self.connection, source, unit, strength);
        }
    }
}
