//! An implementation of the Semantic Learning Machine, which grows layered feed-forward neural
//! networks by operating directly on the semantics of their neurons. The semantics of a node is
//! its vector of outputs over every training instance.
//!
//! A [`SemanticLearningMachine`] builds random initial networks whose output weights are found by
//! least squares regression (or set to a fixed learning step), picks the fittest as its champion,
//! and mutates the champion by adding new neurons to its hidden layers.
//!
//! # Examples
//!
//! ```
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use slm::{AddNeurons, ColumnDataSet, Config, LearningStep, SemanticLearningMachine};
//!
//! let training_set = ColumnDataSet::new(
//!     vec![("x0", vec![0.1, 0.5, 0.9, 0.3]), ("x1", vec![1.0, 0.0, 1.0, 0.5])],
//!     vec![1.0, 0.0, 1.0, 0.5],
//! )
//! .unwrap();
//! let config = Config {
//!     population_size: 4,
//!     learning_step: LearningStep::Fixed(0.5),
//!     ..Config::default()
//! };
//!
//! let mut machine = SemanticLearningMachine::new(config, training_set, AddNeurons::new(2)).unwrap();
//! let mut rng = ChaCha8Rng::seed_from_u64(0);
//!
//! // Build the initial population and pick the champion
//! let champion = machine.create_initial_population(&mut rng).unwrap();
//! assert_eq!(4, champion.predictions().len());
//!
//! // Grow a copy of the champion
//! let offspring = machine.mutate_champion(&mut rng).unwrap();
//! assert!(offspring.num_new_neurons() > 0);
//! ```

// Semantics are never checked for non-finite values; NaN and infinities propagate through the
// network and show up in the fitness of a solution.

pub mod activation;
pub mod config;
pub mod dataset;
pub mod machine;
pub mod mutation;
pub mod network;
pub mod node;
pub mod regression;
pub mod solution;

pub use activation::{Activation, ActivationRegistry};
pub use config::{Config, LearningStep};
pub use dataset::{ColumnDataSet, DataSet};
pub use machine::{Offspring, SemanticLearningMachine};
pub use mutation::{AddNeurons, MutationOperator};
pub use network::NeuralNetwork;
pub use solution::Solution;
