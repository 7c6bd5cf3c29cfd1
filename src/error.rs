//! Errors raised while building or running a trainer.

use crate::backprop::UpdateMethod;

use thiserror::Error;

/// Shorthand for results produced by this crate.
pub type Result<T> = std::result::Result<T, TrainingError>;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum TrainingError {
    /// Input or target data was never loaded into the training set.
    #[error("training data has not been initialized")]
    DataNotInitialized,

    #[error("a trainable network needs at least two layers, found {0}")]
    TooFewLayers(usize),

    #[error("layer {0} has no units")]
    EmptyLayer(usize),

    #[error("no layer with index {0}")]
    UnknownLayer(usize),

    #[error("no connection with index {0}")]
    UnknownConnection(usize),

    #[error("layer {from} is not connected to layer {to}")]
    MissingConnection { from: usize, to: usize },

    #[error("{what} has shape {actual:?}, expected {expected:?}")]
    ShapeMismatch {
        what: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("{which} row {row} has {actual} columns, expected {expected}")]
    RaggedRows {
        which: &'static str,
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("training set has {inputs} input rows but {targets} target rows")]
    RowMismatch { inputs: usize, targets: usize },

    #[error("{which} data has {actual} columns, network expects {expected}")]
    ColumnMismatch {
        which: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("training set has no rows")]
    EmptyTrainingSet,

    #[error("update method {0:?} is not implemented")]
    NotImplemented(UpdateMethod),

    #[error("mini-batch size {size} must be between 1 and {rows}")]
    InvalidBatchSize { size: usize, rows: usize },

    #[error("invalid value {value} for {name}")]
    InvalidParameter { name: &'static str, value: f64 },

    /// Propagation produced an infinite or NaN value.
    #[error("non-finite {quantity} in layer {layer}")]
    NonFinite { layer: usize, quantity: &'static str },
}
