//! The array-based "shadow" of a layered network.
//!
//! A `ShadowNetwork` copies the weights, biases and transfer functions of a
//! `NetworkTopology` into flat arrays, propagates activations and errors
//! through them, and commits the result back on request.

use crate::error::{Result, TrainingError};
use crate::layer::Layer;
use crate::randomizer::{self, WeightInit};
use crate::topology::{CommitTarget, NetworkTopology};

use ndarray::{Array1, ArrayView1};
use rand::Rng;

/// Half-width of the interval biases are drawn from when randomizing.
pub const BIAS_RANGE: f64 = 0.05;

/// A layered network held entirely in arrays.
#[derive(Clone, Debug)]
pub struct ShadowNetwork {
    /// The current input vector.
    input: Array1<f64>,
    /// Every layer after the input layer, ordered input to output.
    layers: Vec<Layer>,
    /// For each entry of `layers`, the index of the topology connection
    /// feeding it.
    connections: Vec<usize>,
}

impl ShadowNetwork {
    /// Copies the state of `topology` into a new shadow network.
    ///
    /// Layer `i` of the topology must be connected to layer `i + 1` for every
    /// consecutive pair.
    pub fn from_topology(topology: &NetworkTopology) -> Result<Self> {
        let sizes: Vec<usize> = topology.layers().iter().map(|l| l.len()).collect();
        if sizes.len() < 2 {
            return Err(TrainingError::TooFewLayers(sizes.len()));
        }
        if let Some(empty) = sizes.iter().position(|&s| s == 0) {
            return Err(TrainingError::EmptyLayer(empty));
        }

        let mut layers = Vec::with_capacity(sizes.len() - 1);
        let mut connections = Vec::with_capacity(sizes.len() - 1);
        for target in 1..sizes.len() {
            let source = target - 1;
            let id = topology
                .find_connection(source, target)
                .ok_or(TrainingError::MissingConnection {
                    from: source,
                    to: target,
                })?;
            let neurons = topology.layer(target)?;
            let weights = topology.connection(id)?.strengths().t().to_owned();
            let biases = Array1::from(neurons.biases().to_vec());
            layers.push(Layer::new(neurons.transfer(), weights, biases));
            connections.push(id);
        }
        Ok(ShadowNetwork {
            input: Array1::zeros(sizes[0]),
            layers,
            connections,
        })
    }

    /// Returns the size of the input layer to the network.
    pub fn input_len(&self) -> usize {
        self.input.len()
    }

    /// Returns the size of the output layer from the network.
    pub fn output_len(&self) -> usize {
        self.output_layer().output_len()
    }

    /// Returns every layer after the input layer.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn input(&self) -> &Array1<f64> {
        &self.input
    }

    /// Returns the activations of the output layer.
    pub fn output(&self) -> &Array1<f64> {
        self.output_layer().activations()
    }

    /// Feeds the provided `input` through the network, returning the output
    /// layer.
    pub fn run(&mut self, input: &[f64]) -> Result<Vec<f64>> {
        if input.len() != self.input_len() {
            return Err(TrainingError::ColumnMismatch {
                which: "input",
                expected: self.input_len(),
                actual: input.len(),
            });
        }
        self.feed_forward(ArrayView1::from(input))?;
        Ok(self.output().to_vec())
    }

    /// Feeds `input` forward through every layer.
    ///
    /// Fails if any layer produces a value that is not finite.
    pub fn feed_forward(&mut self, input: ArrayView1<f64>) -> Result<()> {
        self.input.assign(&input);
        for i in 0..self.layers.len() {
            if i == 0 {
                self.layers[0].forward(self.input.view());
            } else {
                let (previous, layer) = adjacent_mut(&mut self.layers, i);
                layer.forward(previous.activations().view());
            }
            if let Some(quantity) = self.layers[i].non_finite_state() {
                return Err(TrainingError::NonFinite {
                    layer: i + 1,
                    quantity,
                });
            }
        }
        Ok(())
    }

    /// Feeds the output `errors` (target minus output) back through the
    /// network, computing the deltas of every layer.
    pub fn feed_backwards(&mut self, errors: &Array1<f64>) -> Result<()> {
        let last = self.layers.len() - 1;
        self.layers[last].set_output_errors(errors);
        for i in (1..self.layers.len()).rev() {
            let (previous, layer) = adjacent_mut(&mut self.layers, i);
            layer.backpropagate_into(previous);
        }
        if let Some(i) = self.layers.iter().position(|l| !l.deltas_finite()) {
            return Err(TrainingError::NonFinite {
                layer: i + 1,
                quantity: "delta",
            });
        }
        Ok(())
    }

    /// Adds the gradients for the current deltas to each layer's batch
    /// accumulator.
    pub fn accumulate_gradients(&mut self) {
        for i in 0..self.layers.len() {
            if i == 0 {
                self.layers[0].accumulate_gradient(self.input.view());
            } else {
                let (previous, layer) = adjacent_mut(&mut self.layers, i);
                layer.accumulate_gradient(previous.activations().view());
            }
        }
    }

    /// Fails if any layer's accumulated gradient has overflowed.
    pub fn check_gradients(&self) -> Result<()> {
        match self.layers.iter().position(|l| !l.gradient_finite()) {
            Some(i) => Err(TrainingError::NonFinite {
                layer: i + 1,
                quantity: "gradient",
            }),
            None => Ok(()),
        }
    }

    /// Applies and resets the accumulated gradients of every layer.
    pub fn apply_updates(&mut self, learning_rate: f64, momentum: f64, scale: f64) {
        for layer in &mut self.layers {
            layer.apply_update(learning_rate, momentum, scale);
        }
    }

    /// Drops any partially accumulated gradients.
    pub fn clear_gradients(&mut self) {
        for layer in &mut self.layers {
            layer.clear_gradient();
        }
    }

    /// Redraws every weight from `init` and every bias uniformly from
    /// `[-BIAS_RANGE, BIAS_RANGE)`.
    pub fn randomize<R: Rng + ?Sized>(&mut self, init: &WeightInit, rng: &mut R) -> Result<()> {
        init.validate()?;
        for layer in &mut self.layers {
            init.fill(layer.weights_mut(), rng)?;
            randomizer::fill_uniform(layer.biases_mut(), -BIAS_RANGE, BIAS_RANGE, rng);
        }
        Ok(())
    }

    /// Writes activations, biases and weights into `target`, using the layer
    /// and connection indices of the topology this network was built from.
    pub fn commit(&self, target: &mut dyn CommitTarget) {
        for (i, (layer, &connection)) in self.layers.iter().zip(&self.connections).enumerate() {
            let topology_layer = i + 1;
            for (unit, (&activation, &bias)) in
                layer.activations().iter().zip(layer.biases()).enumerate()
            {
                target.force_set_activation(topology_layer, unit, activation);
                target.set_bias(topology_layer, unit, bias);
            }
            for ((unit, source), &strength) in layer.weights().indexed_iter() {
                target.force_set_strength(connection, source, unit, strength);
            }
        }
    }

    fn output_layer(&self) -> &Layer {
        &self.layers[self.layers.len() - 1]
    }
}

/// Gets a layer and the one before it.
fn adjacent_mut(layers: &mut [Layer], i: usize) -> (&mut Layer, &mut Layer) {
    let (before, after) = layers.split_at_mut(i);
    (&mut before[i - 1], &mut after[0])
}
