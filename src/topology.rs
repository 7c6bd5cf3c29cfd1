//! A snapshot of a node/edge network's structure and state.
//!
//! Trainers never hold on to the network they train. They read a
//! `NetworkTopology` once at construction and write their results back
//! through a `CommitTarget`, which `NetworkTopology` itself implements.

use crate::error::{Result, TrainingError};
use crate::transfer::TransferFunction;

use ndarray::Array2;

/// The one-way write interface from a trainer into a network.
///
/// Layer and connection indices are the ones used by the `NetworkTopology`
/// the trainer was built from. Writes to indices the target does not have
/// are ignored.
pub trait CommitTarget {
    /// Overwrites the activation of `unit` in `layer`.
    fn force_set_activation(&mut self, layer: usize, unit: usize, value: f64);

    /// Overwrites the bias of `unit` in `layer`.
    fn set_bias(&mut self, layer: usize, unit: usize, value: f64);

    /// Overwrites the strength of the synapse from `source` to `target`
    /// within `connection`.
    fn force_set_strength(
        &mut self,
        connection: usize,
        source: usize,
        target: usize,
        value: f64,
    );
}

/// A group of neurons sharing a transfer function.
#[derive(Clone, Debug)]
pub struct NeuronLayer {
    transfer: TransferFunction,
    activations: Vec<f64>,
    biases: Vec<f64>,
}

impl NeuronLayer {
    fn new(size: usize, transfer: TransferFunction) -> Self {
        NeuronLayer {
            transfer,
            activations: vec![0.0; size],
            biases: vec![0.0; size],
        }
    }

    pub fn len(&self) -> usize {
        self.activations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activations.is_empty()
    }

    pub fn transfer(&self) -> TransferFunction {
        self.transfer
    }

    pub fn activations(&self) -> &[f64] {
        &self.activations
    }

    pub fn biases(&self) -> &[f64] {
        &self.biases
    }
}

/// All-to-all synapses from one layer to another.
#[derive(Clone, Debug)]
pub struct Connection {
    source: usize,
    target: usize,
    /// Synapse strengths in fan-out order: one row per source neuron, one
    /// column per target neuron.
    strengths: Array2<f64>,
}

impl Connection {
    pub fn source(&self) -> usize {
        self.source
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn strengths(&self) -> &Array2<f64> {
        &self.strengths
    }
}

/// An arena of neuron layers and the connections between them.
#[derive(Clone, Debug, Default)]
pub struct NetworkTopology {
    layers: Vec<NeuronLayer>,
    connections: Vec<Connection>,
}

impl NetworkTopology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a strictly layered network, connecting every layer to the next.
    ///
    /// Arguments:
    ///  * `layer_sizes` - the number of neurons in each layer, input first.
    ///  * `transfer` - the transfer function of every layer.
    pub fn layered(layer_sizes: &[usize], transfer: TransferFunction) -> Self {
        let mut topology = NetworkTopology::new();
        for &size in layer_sizes {
            topology.add_layer(size, transfer);
        }
        for i in 1..layer_sizes.len() {
            topology.connections.push(Connection {
                source: i - 1,
                target: i,
                strengths: Array2::zeros((layer_sizes[i - 1], layer_sizes[i])),
            });
        }
        topology
    }

    /// Adds a layer of `size` neurons, returning its index.
    pub fn add_layer(&mut self, size: usize, transfer: TransferFunction) -> usize {
        self.layers.push(NeuronLayer::new(size, transfer));
        self.layers.len() - 1
    }

    /// Connects every neuron of `source` to every neuron of `target` with
    /// zero-strength synapses, returning the connection index.
    pub fn connect(&mut self, source: usize, target: usize) -> Result<usize> {
        let rows = self.layer(source)?.len();
        let cols = self.layer(target)?.len();
        self.connections.push(Connection {
            source,
            target,
            strengths: Array2::zeros((rows, cols)),
        });
        Ok(self.connections.len() - 1)
    }

    pub fn layers(&self) -> &[NeuronLayer] {
        &self.layers
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn layer(&self, index: usize) -> Result<&NeuronLayer> {
        self.layers
            .get(index)
            .ok_or(TrainingError::UnknownLayer(index))
    }

    pub fn connection(&self, index: usize) -> Result<&Connection> {
        self.connections
            .get(index)
            .ok_or(TrainingError::UnknownConnection(index))
    }

    /// Returns the index of the first connection from `source` to `target`.
    pub fn find_connection(&self, source: usize, target: usize) -> Option<usize> {
        self.connections
            .iter()
            .position(|c| c.source == source && c.target == target)
    }

    /// Returns the strength of the synapse from `source` to `target` neuron.
    pub fn strength(&self, connection: usize, source: usize, target: usize) -> Option<f64> {
        self.connections
            .get(connection)
            .and_then(|c| c.strengths.get((source, target)))
            .copied()
    }

    pub fn set_transfer(&mut self, layer: usize, transfer: TransferFunction) -> Result<()> {
        self.layer_mut(layer)?.transfer = transfer;
        Ok(())
    }

    pub fn set_biases(&mut self, layer: usize, biases: &[f64]) -> Result<()> {
        let layer_ref = self.layer_mut(layer)?;
        if biases.len() != layer_ref.len() {
            return Err(TrainingError::ShapeMismatch {
                what: "bias vector",
                expected: (layer_ref.len(), 1),
                actual: (biases.len(), 1),
            });
        }
        layer_ref.biases.copy_from_slice(biases);
        Ok(())
    }

    /// Replaces all strengths of a connection. `strengths` is in fan-out
    /// order (source rows, target columns).
    pub fn set_strengths(&mut self, connection: usize, strengths: Array2<f64>) -> Result<()> {
        let conn = self
            .connections
            .get_mut(connection)
            .ok_or(TrainingError::UnknownConnection(connection))?;
        if strengths.dim() != conn.strengths.dim() {
            return Err(TrainingError::ShapeMismatch {
                what: "strength matrix",
                expected: conn.strengths.dim(),
                actual: strengths.dim(),
            });
        }
        conn.strengths = strengths;
        Ok(())
    }

    fn layer_mut(&mut self, index: usize) -> Result<&mut NeuronLayer> {
        self.layers
            .get_mut(index)
            .ok_or(TrainingError::UnknownLayer(index))
    }
}

impl CommitTarget for NetworkTopology {
    fn force_set_activation(&mut self, layer: usize, unit: usize, value: f64) {
        if let Some(slot) = self
            .layers
            .get_mut(layer)
            .and_then(|l| l.activations.get_mut(unit))
        {
            *slot = value;
        }
    }

    fn set_bias(&mut self, layer: usize, unit: usize, value: f64) {
        if let Some(slot) = self.layers.get_mut(layer).and_then(|l| l.biases.get_mut(unit)) {
            *slot = value;
        }
    }

    fn force_set_strength(
        &mut self,
        connection: usize,
        source: usize,
        target: usize,
        value: f64,
    ) {
        if let Some(slot) = self
            .connections
            .get_mut(connection)
            .and_then(|c| c.strengths.get_mut((source, target)))
        {
            *slot = value;
        }
    }
}
