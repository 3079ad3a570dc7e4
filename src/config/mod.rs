//! Run configuration for a [`SemanticLearningMachine`][crate::SemanticLearningMachine].

mod error;
#[cfg(feature = "json")]
mod functions;

#[cfg(feature = "json")]
use std::path::Path;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::activation::ActivationRegistry;

pub use error::Error;

/// How the weights of the connections to the output neuron are chosen.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "LearningStepRepr", into = "LearningStepRepr")
)]
pub enum LearningStep {
    /// Solve for the weights by least-squares regression against the remaining error.
    Optimized,
    /// Use this constant for every output weight.
    Fixed(f64),
}

impl Default for LearningStep {
    fn default() -> Self {
        Self::Optimized
    }
}

// `"optimized"` or a number
#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum LearningStepRepr {
    Fixed(f64),
    Named(String),
}

#[cfg(feature = "serde")]
impl TryFrom<LearningStepRepr> for LearningStep {
    type Error = Error;

    fn try_from(repr: LearningStepRepr) -> Result<Self, Self::Error> {
        match repr {
            LearningStepRepr::Fixed(step) => Ok(Self::Fixed(step)),
            LearningStepRepr::Named(name) if name == "optimized" => Ok(Self::Optimized),
            LearningStepRepr::Named(name) => Err(Error::UnknownLearningStep(name)),
        }
    }
}

#[cfg(feature = "serde")]
impl From<LearningStep> for LearningStepRepr {
    fn from(step: LearningStep) -> Self {
        match step {
            LearningStep::Optimized => Self::Named("optimized".to_string()),
            LearningStep::Fixed(step) => Self::Fixed(step),
        }
    }
}

/// Settings of a run.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct Config {
    /// Number of solutions in the initial population
    pub population_size: usize,
    /// Number of hidden layers of every network
    pub layers: usize,
    /// How output weights are chosen
    pub learning_step: LearningStep,
    /// Upper bound on the random fan-in from the sensors
    pub max_connections: usize,
    /// Names of the activation functions eligible for random choice, or empty for all of them
    pub activations: Vec<String>,
    /// Seed of the random number generator, or `None` to seed from system entropy
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            population_size: 10,
            layers: 2,
            learning_step: LearningStep::Optimized,
            max_connections: 10,
            activations: Vec::new(),
            seed: None,
        }
    }
}

impl Config {
    /// Loads a configuration from a JSON string and validates it.
    #[cfg(feature = "json")]
    pub fn from_json_str(s: &str) -> Result<Self, Error> {
        functions::load_str(s)
    }

    /// Loads a configuration from a JSON file and validates it.
    #[cfg(feature = "json")]
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        functions::load_file(path)
    }

    /// Checks that every setting is usable.
    pub fn validate(&self) -> Result<(), Error> {
        if self.population_size < 1 {
            return Err(Error::InvalidPopulationSize(self.population_size));
        }
        if self.layers < 1 {
            return Err(Error::InvalidLayers(self.layers));
        }
        if self.max_connections < 1 {
            return Err(Error::InvalidMaxConnections(self.max_connections));
        }
        if let LearningStep::Fixed(step) = self.learning_step {
            if !step.is_finite() {
                return Err(Error::NonFiniteLearningStep(step));
            }
        }
        self.activation_registry()?;

        Ok(())
    }

    /// Builds the registry of activation functions eligible for random choice.
    pub fn activation_registry(&self) -> Result<ActivationRegistry, Error> {
        ActivationRegistry::from_names(&self.activations)
    }

    /// Returns a random number generator seeded from [`seed`][Self::seed].
    pub fn rng(&self) -> ChaCha8Rng {
        match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;
    use crate::activation::Activation;

    #[test]
    fn test_validate() {
        assert!(Config::default().validate().is_ok());

        let config = Config {
            max_connections: 0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidMaxConnections(0))
        ));

        let config = Config {
            layers: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidLayers(0))));

        let config = Config {
            population_size: 0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidPopulationSize(0))
        ));

        let config = Config {
            learning_step: LearningStep::Fixed(f64::INFINITY),
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::NonFiniteLearningStep(_))
        ));

        let config = Config {
            activations: vec!["tanh".to_string(), "softmax".to_string()],
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::UnknownActivation(name)) if name == "softmax"
        ));
    }

    #[test]
    fn test_seeded_rng() {
        let config = Config {
            seed: Some(42),
            ..Config::default()
        };

        let a: Vec<u32> = config.rng().sample_iter(rand::distributions::Standard).take(8).collect();
        let b: Vec<u32> = config.rng().sample_iter(rand::distributions::Standard).take(8).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_activation_registry() {
        let config = Config {
            activations: vec!["relu".to_string()],
            ..Config::default()
        };
        assert_eq!(&[Activation::Relu], config.activation_registry().unwrap().activations());
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_from_json() {
        let config = Config::from_json_str(
            r#"{
                "population_size": 4,
                "layers": 3,
                "learning_step": 0.5,
                "max_connections": 2,
                "activations": ["tanh", "sigmoid"],
                "seed": 7
            }"#,
        )
        .unwrap();
        assert_eq!(
            Config {
                population_size: 4,
                layers: 3,
                learning_step: LearningStep::Fixed(0.5),
                max_connections: 2,
                activations: vec!["tanh".to_string(), "sigmoid".to_string()],
                seed: Some(7),
            },
            config
        );

        let config = Config::from_json_str(r#"{ "learning_step": "optimized" }"#).unwrap();
        assert_eq!(LearningStep::Optimized, config.learning_step);
        assert_eq!(Config::default().layers, config.layers);

        assert!(matches!(
            Config::from_json_str(r#"{ "learning_step": "adaptive" }"#),
            Err(Error::Serde(_))
        ));
        assert!(matches!(
            Config::from_json_str(r#"{ "max_connections": 0 }"#),
            Err(Error::InvalidMaxConnections(0))
        ));
        assert!(matches!(
            Config::from_json_str(r#"{ "generations": 10 }"#),
            Err(Error::Serde(_))
        ));
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_from_json_file() {
        let path = std::env::temp_dir().join(format!("slm_config_{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "layers": 4, "seed": 1 }"#).unwrap();

        let config = Config::from_json_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(4, config.layers);
        assert_eq!(Some(1), config.seed);

        assert!(matches!(
            Config::from_json_file(&path),
            Err(Error::Io(_))
        ));
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_learning_step_round_trip() {
        let json = serde_json::to_string(&LearningStep::Optimized).unwrap();
        assert_eq!(r#""optimized""#, json);
        let json = serde_json::to_string(&LearningStep::Fixed(0.25)).unwrap();
        assert_eq!("0.25", json);
    }
}
