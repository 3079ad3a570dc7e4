//! The Semantic Learning Machine: construction of random initial solutions and mutation of the
//! champion.

mod error;
mod mutate;

pub use error::{Error, Operation};
pub use mutate::Offspring;

use std::sync::Arc;

use log::{debug, trace, warn};
use nalgebra::{DMatrix, DVector};
use rand::seq::index;
use rand::Rng;

use crate::activation::{Activation, ActivationRegistry};
use crate::config::{self, Config, LearningStep};
use crate::dataset::DataSet;
use crate::mutation::MutationOperator;
use crate::network::{self, NeuralNetwork};
use crate::node::{Neuron, NeuronId, NodeId, Sensor};
use crate::regression;
use crate::solution::{RootMeanSquaredError, Solution};

/// How the sources of a layer are chosen when connecting it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum FanIn {
    /// Every source connects to every target.
    Full,
    /// A random subset of at most `max_connections` sources connects to every target.
    RandomSparse,
}

/// Returns between one and `min(max_connections, candidates.len())` distinct candidates, sampled
/// uniformly without replacement. Returns nothing if there are no candidates.
pub(crate) fn sample_sources<R: Rng + ?Sized>(
    candidates: &[NodeId],
    max_connections: usize,
    rng: &mut R,
) -> Vec<NodeId> {
    if candidates.is_empty() {
        return Vec::new();
    }

    // `max_connections` is validated to be at least one
    let upper = max_connections.min(candidates.len()).max(1);
    let count = rng.gen_range(1..=upper);

    index::sample(rng, candidates.len(), count)
        .into_iter()
        .map(|i| candidates[i])
        .collect()
}

/// Returns the neurons of the hidden layer at `index` as connection sources.
fn layer_sources(network: &NeuralNetwork, index: usize) -> Result<Vec<NodeId>, network::Error> {
    Ok(network
        .layer(index)?
        .iter()
        .map(|&id| NodeId::Neuron(id))
        .collect())
}

/// Grows neural networks by operating on the semantics of their neurons.
///
/// Holds the run state: the training set, the sensors built from it, the population, and the
/// current champion.
pub struct SemanticLearningMachine<D, M> {
    config: Config,
    activations: ActivationRegistry,
    training_set: D,
    target: DVector<f64>,
    mutation_operator: M,
    // Built once by `create_initial_population` and shared by every network
    sensors: Option<Arc<[Sensor]>>,
    population: Vec<Solution>,
    current_champion: Option<Solution>,
}

impl<D: DataSet, M: MutationOperator> SemanticLearningMachine<D, M> {
    /// Returns a new `SemanticLearningMachine`, validating `config` and `training_set`.
    pub fn new(config: Config, training_set: D, mutation_operator: M) -> Result<Self, config::Error> {
        config.validate()?;
        let activations = config.activation_registry()?;

        let target = DVector::from_column_slice(training_set.target_variable());
        if target.is_empty() {
            return Err(config::Error::EmptyTrainingSet);
        }

        let variables = training_set.input_variables();
        if variables.is_empty() {
            return Err(config::Error::NoInputVariables);
        }
        for name in variables {
            let column = training_set
                .input_column(&name)
                .ok_or_else(|| config::Error::MissingColumn(name.clone()))?;

            if column.len() != target.len() {
                return Err(config::Error::ColumnLength {
                    name,
                    expected: target.len(),
                    found: column.len(),
                });
            }
        }

        Ok(Self {
            config,
            activations,
            training_set,
            target,
            mutation_operator,
            sensors: None,
            population: Vec::new(),
            current_champion: None,
        })
    }

    /// Returns the configuration of this run.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the activation functions eligible for random choice.
    pub fn activations(&self) -> &ActivationRegistry {
        &self.activations
    }

    /// Returns the training set.
    pub fn training_set(&self) -> &D {
        &self.training_set
    }

    /// Returns the target vector of the training set.
    pub fn target(&self) -> &DVector<f64> {
        &self.target
    }

    /// Returns the mutation operator.
    pub fn mutation_operator(&self) -> &M {
        &self.mutation_operator
    }

    /// Returns the sensors if the initial population has been created.
    pub fn sensors(&self) -> Option<&Arc<[Sensor]>> {
        self.sensors.as_ref()
    }

    /// Returns the current population.
    pub fn population(&self) -> &[Solution] {
        &self.population
    }

    /// Returns the current champion if there is one.
    pub fn current_champion(&self) -> Option<&Solution> {
        self.current_champion.as_ref()
    }

    /// Builds one sensor per input variable of the training set.
    pub fn create_sensors(&self) -> Result<Arc<[Sensor]>, config::Error> {
        self.training_set
            .input_variables()
            .into_iter()
            .map(|name| {
                let column = self
                    .training_set
                    .input_column(&name)
                    .ok_or_else(|| config::Error::MissingColumn(name.clone()))?;
                Ok(Sensor::new(name, DVector::from_column_slice(column)))
            })
            .collect()
    }

    /// Builds the sensors and `population_size` random solutions, and makes the fittest solution
    /// the current champion.
    ///
    /// A member that can't be built is skipped. The previous population and champion are only
    /// replaced once at least one member has been built.
    pub fn create_initial_population<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<&Solution, Error> {
        let sensors = self.create_sensors()?;
        let attempts = self.config.population_size;

        let mut population = Vec::with_capacity(attempts);
        let mut last_error = None;
        for member in 0..attempts {
            // Initial solutions are not built on top of a previous champion
            match self.build_solution(&sensors, None, rng) {
                Ok(solution) => population.push(solution),
                Err(e) => {
                    warn!("skipping population member {}: {}", member, e);
                    last_error = Some(e);
                }
            }
        }

        let champion = match population.iter().min_by(|a, b| a.compare_fitness(b)) {
            Some(best) => best.snapshot_sharing(),
            None => {
                return Err(Error::EmptyPopulation {
                    attempts,
                    last: Box::new(last_error.unwrap_or(Error::NoChampion)),
                })
            }
        };

        debug!(
            "created initial population of {} of {} solutions, champion fitness {}",
            population.len(),
            attempts,
            champion.fitness()
        );

        self.sensors = Some(sensors);
        self.population = population;

        Ok(&*self.current_champion.insert(champion))
    }

    /// Makes `solution` the current champion, replacing any previous one.
    pub fn set_champion(&mut self, solution: Solution) {
        self.current_champion = Some(solution);
    }

    /// Builds one random solution on top of `sensors`, regressing against what the current
    /// champion misses.
    ///
    /// The network is a chain of single-neuron hidden layers whose last neuron uses `tanh`. The
    /// first hidden layer reads from a random subset of the sensors, and the output neuron weights
    /// are chosen according to the configured [`LearningStep`].
    pub fn initialize_solution<R: Rng + ?Sized>(
        &self,
        sensors: &Arc<[Sensor]>,
        rng: &mut R,
    ) -> Result<Solution, Error> {
        self.build_solution(sensors, self.current_champion.as_ref(), rng)
    }

    fn build_solution<R: Rng + ?Sized>(
        &self,
        sensors: &Arc<[Sensor]>,
        champion: Option<&Solution>,
        rng: &mut R,
    ) -> Result<Solution, Error> {
        let output_neuron = self
            .activations
            .create_neuron(Some(Activation::Identity), rng);
        let hidden_layers = self.initialize_hidden_layers(rng);

        let mut network = NeuralNetwork::new(Arc::clone(sensors), hidden_layers, output_neuron)
            .map_err(Error::network(Operation::CreateNetwork))?;
        let layers = network.hidden_layers().len();

        // Connect sensors to the first hidden layer, then chain the hidden layers
        let sensor_ids: Vec<NodeId> = network.sensor_ids().collect();
        let first_layer = network
            .layer(0)
            .map(<[NeuronId]>::to_vec)
            .map_err(Error::network(Operation::ConnectLayer(0)))?;
        self.connect_nodes(
            &mut network,
            &sensor_ids,
            &first_layer,
            FanIn::RandomSparse,
            rng,
        )
        .map_err(Error::network(Operation::ConnectLayer(0)))?;

        for index in 1..layers {
            self.connect_layer(&mut network, index, FanIn::Full, rng)
                .map_err(Error::network(Operation::ConnectLayer(index)))?;
        }

        for index in 0..layers {
            network
                .calculate_layer(index)
                .map_err(Error::network(Operation::CalculateLayer(index)))?;
        }

        let partial_semantics = network
            .partial_semantics()
            .map_err(Error::network(Operation::PartialSemantics))?;
        let weights = self.learning_step(&partial_semantics, champion)?;

        self.connect_output(&mut network, &weights)
            .map_err(Error::network(Operation::ConnectOutput))?;
        network
            .calculate_output()
            .map_err(Error::network(Operation::CalculateOutput))?;

        let solution = Solution::new(network, &self.target, &RootMeanSquaredError)
            .map_err(Error::network(Operation::WrapSolution))?;

        debug!("initialized solution with fitness {}", solution.fitness());

        Ok(solution)
    }

    /// Returns `layers - 1` hidden layers of one randomly activated neuron each, followed by a
    /// layer with a single `tanh` neuron.
    fn initialize_hidden_layers<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Vec<Neuron>> {
        let mut hidden_layers: Vec<Vec<Neuron>> = (1..self.config.layers)
            .map(|_| vec![self.activations.create_neuron(None, rng)])
            .collect();
        hidden_layers.push(vec![self
            .activations
            .create_neuron(Some(Activation::Tanh), rng)]);
        hidden_layers
    }

    /// Returns the output weights for the given partial semantics, one per column. An optimized
    /// step regresses against the part of the target that `champion` does not already predict,
    /// or against the whole target without a champion.
    pub fn learning_step(
        &self,
        partial_semantics: &DMatrix<f64>,
        champion: Option<&Solution>,
    ) -> Result<DVector<f64>, Error> {
        match self.config.learning_step {
            LearningStep::Optimized => self.optimized_learning_step(partial_semantics, champion),
            LearningStep::Fixed(step) => Ok(DVector::from_element(partial_semantics.ncols(), step)),
        }
    }

    fn optimized_learning_step(
        &self,
        partial_semantics: &DMatrix<f64>,
        champion: Option<&Solution>,
    ) -> Result<DVector<f64>, Error> {
        let mut delta_target = self.target.clone();

        if let Some(champion) = champion {
            let predictions = champion.predictions();
            if predictions.len() != delta_target.len() {
                return Err(config::Error::PredictionLength {
                    expected: delta_target.len(),
                    found: predictions.len(),
                }
                .into());
            }
            delta_target -= predictions;
        }

        regression::optimized_learning_step(partial_semantics, &delta_target).map_err(|e| {
            warn!("optimized learning step failed: {}", e);
            e.into()
        })
    }

    /// Connects `from` to every neuron of `to`, with weights drawn uniformly from `[-1, 1]`.
    fn connect_nodes<R: Rng + ?Sized>(
        &self,
        network: &mut NeuralNetwork,
        from: &[NodeId],
        to: &[NeuronId],
        fan_in: FanIn,
        rng: &mut R,
    ) -> Result<(), network::Error> {
        if from.is_empty() {
            return Err(network::Error::NoCandidates);
        }

        let sources = match fan_in {
            FanIn::Full => from.to_vec(),
            FanIn::RandomSparse => sample_sources(from, self.config.max_connections, rng),
        };

        trace!(
            "connecting {} of {} sources to {} neurons",
            sources.len(),
            from.len(),
            to.len()
        );

        for &target in to {
            for &source in &sources {
                let weight = rng.gen_range(-1.0..=1.0);
                network.connect(source, target, weight)?;
            }
        }

        Ok(())
    }

    /// Connects every neuron of the previous hidden layer to every neuron of the hidden layer at
    /// `index`.
    fn connect_layer<R: Rng + ?Sized>(
        &self,
        network: &mut NeuralNetwork,
        index: usize,
        fan_in: FanIn,
        rng: &mut R,
    ) -> Result<(), network::Error> {
        let from = layer_sources(network, index - 1)?;
        let to = network.layer(index)?.to_vec();
        self.connect_nodes(network, &from, &to, fan_in, rng)
    }

    /// Connects the neurons of the last hidden layer to the output neuron, weighting neuron `j` by
    /// `weights[j]`.
    fn connect_output(
        &self,
        network: &mut NeuralNetwork,
        weights: &DVector<f64>,
    ) -> Result<(), network::Error> {
        let last = network.hidden_layers().len() - 1;
        let sources = network.layer(last)?.to_vec();
        let output = network.output_neuron_id();

        if sources.len() != weights.len() {
            return Err(network::Error::SemanticsLength {
                node: output.into(),
                expected: sources.len(),
                found: weights.len(),
            });
        }

        for (&source, &weight) in sources.iter().zip(weights.iter()) {
            network.connect(source.into(), output, weight)?;
        }

        Ok(())
    }
}
