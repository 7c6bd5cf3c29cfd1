//! Iterative supervised training for node/edge neural networks.
//!
//! Trainers copy a `NetworkTopology` into flat arrays (a "shadow" network),
//! train those arrays, and commit the results back through a
//! `CommitTarget` when asked.

extern crate itertools;
extern crate log;
extern crate ndarray;
extern crate rand;
extern crate rand_distr;
#[macro_use]
extern crate serde_derive;
extern crate thiserror;

pub mod backprop;
pub mod dataset;
pub mod error;
pub mod layer;
pub mod lms;
pub mod randomizer;
pub mod shadow;
pub mod topology;
pub mod trainer;
pub mod transfer;

pub use backprop::{BackpropConfig, BackpropTrainer, UpdateMethod};
pub use dataset::TrainingSet;
pub use error::{Result, TrainingError};
pub use lms::{LmsConfig, LmsTrainer};
pub use randomizer::WeightInit;
pub use shadow::ShadowNetwork;
pub use topology::{CommitTarget, NetworkTopology};
pub use trainer::{IterableTrainer, Logging, StopCondition, TrainingLoop};
pub use transfer::TransferFunction;
