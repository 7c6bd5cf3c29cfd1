//! Trains a small classifier on noisy points around the unit circle.
//!
//! Usage: `shadownet-train [config.json]`, where the optional file holds a
//! `BackpropConfig`.

use shadownet::{
    BackpropConfig, IterableTrainer, Logging, NetworkTopology, ShadowNetwork, StopCondition,
    TrainingLoop, TrainingSet, TransferFunction,
};

use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::Normal;
use std::error::Error;
use std::fs::File;
use std::io::BufReader;

type Input = [f64; 2];
type Output = [f64; 2];

fn generate_data(
    rng: &mut StdRng,
    num_samples: usize,
) -> Result<Vec<(Input, Output)>, Box<dyn Error>> {
    let radians = Uniform::new(0.0, 2.0 * std::f64::consts::PI);
    let noise = Normal::new(0.0, 0.1)?;

    let mut data = Vec::with_capacity(num_samples);
    for _ in 0..num_samples {
        let theta = radians.sample(rng);
        let dx = noise.sample(rng);
        let dy = noise.sample(rng);
        let point = [theta.cos() + dx, theta.sin() + dy];
        let class = if point[0] * point[1] > 0.0 {
            [1.0, 0.0]
        } else {
            [0.0, 1.0]
        };
        data.push((point, class));
    }
    Ok(data)
}

fn score(
    set_name: &str,
    network: &mut ShadowNetwork,
    test_data: &[(Input, Output)],
) -> Result<(), Box<dyn Error>> {
    let mut num_correct = 0;
    for (input, expected) in test_data {
        let output = network.run(input)?;
        let class = if output[0] > output[1] { 0 } else { 1 };
        if expected[class] == 1.0 {
            num_correct += 1;
        }
    }
    println!(
        "{} set results: {} of {} correct",
        set_name,
        num_correct,
        test_data.len()
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => serde_json::from_reader(BufReader::new(File::open(path)?))?,
        None => BackpropConfig::new().learning_rate(0.5).momentum(0.5),
    };
    log::info!("Training with {:?}", config);

    let mut rng = StdRng::seed_from_u64(2024);
    let training_data = generate_data(&mut rng, 2_000)?;
    let mut topology = NetworkTopology::layered(&[2, 5, 5, 2], TransferFunction::Logistic);

    let mut trainer = config.build(&topology, TrainingSet::new(&training_data)?)?;
    trainer.randomize(&mut rng)?;
    let trainer = TrainingLoop::new(trainer)
        .stop_condition(StopCondition::Iterations(20_000))
        .logging(Logging::Iterations(2_000))
        .commit_every(5_000)
        .run_committing(&mut rng, &mut topology)?;

    // Score a fresh shadow of the committed network.
    let mut network = ShadowNetwork::from_topology(&topology)?;
    println!();
    println!("Trained for {} iterations", trainer.iteration());
    score("Training", &mut network, &training_data)?;
    score("Test", &mut network, &generate_data(&mut rng, 500)?)?;
    Ok(())
}
