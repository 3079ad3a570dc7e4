//! The error type for building and mutating solutions.

use std::{error, fmt};

use crate::{config, network, regression};

/// The step of building or mutating a solution in which an error occurred.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    /// Creating the network from its sensors and neurons.
    CreateNetwork,
    /// Connecting the hidden layer with the given index to its sources.
    ConnectLayer(usize),
    /// Calculating the hidden layer with the given index.
    CalculateLayer(usize),
    /// Collecting the semantics of the last hidden layer.
    PartialSemantics,
    /// Connecting the last hidden layer to the output neuron.
    ConnectOutput,
    /// Calculating the output neuron.
    CalculateOutput,
    /// Wrapping the network as a solution.
    WrapSolution,
    /// Adding mutated neurons to the hidden layer with the given index.
    ExtendLayer(usize),
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::CreateNetwork => write!(f, "creating the network"),
            Self::ConnectLayer(index) => write!(f, "connecting hidden layer {}", index),
            Self::CalculateLayer(index) => write!(f, "calculating hidden layer {}", index),
            Self::PartialSemantics => write!(f, "collecting partial semantics"),
            Self::ConnectOutput => write!(f, "connecting the output neuron"),
            Self::CalculateOutput => write!(f, "calculating the output neuron"),
            Self::WrapSolution => write!(f, "wrapping the solution"),
            Self::ExtendLayer(index) => write!(f, "extending hidden layer {}", index),
        }
    }
}

/// An error while building or mutating solutions.
#[derive(Debug)]
pub enum Error {
    /// The configuration or training set is invalid.
    Config(config::Error),
    /// A network precondition was violated during an operation.
    Network {
        /// The operation that failed.
        operation: Operation,
        /// The violated precondition.
        source: network::Error,
    },
    /// The optimized learning step could not be computed.
    Regression(regression::Error),
    /// There is no current champion to mutate.
    NoChampion,
    /// The mutation operator did not return one batch per hidden layer.
    MutationLayerCount {
        /// The number of hidden layers.
        expected: usize,
        /// The number of batches returned.
        found: usize,
    },
    /// No member of the initial population could be built.
    EmptyPopulation {
        /// The number of members attempted.
        attempts: usize,
        /// The error of the last attempt.
        last: Box<Error>,
    },
}

impl Error {
    pub(crate) fn network(operation: Operation) -> impl FnOnce(network::Error) -> Self {
        move |source| Self::Network { operation, source }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "configuration error: {}", e),
            Self::Network { operation, source } => {
                write!(f, "network error while {}: {}", operation, source)
            }
            Self::Regression(e) => write!(f, "regression failed: {}", e),
            Self::NoChampion => write!(f, "no current champion"),
            Self::MutationLayerCount { expected, found } => write!(
                f,
                "mutation returned {} batches for {} hidden layers",
                found, expected
            ),
            Self::EmptyPopulation { attempts, last } => write!(
                f,
                "none of {} population members could be built, last error: {}",
                attempts, last
            ),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Network { source, .. } => Some(source),
            Self::Regression(e) => Some(e),
            Self::EmptyPopulation { last, .. } => Some(last.as_ref()),
            _ => None,
        }
    }
}

impl From<config::Error> for Error {
    fn from(e: config::Error) -> Self {
        Self::Config(e)
    }
}

impl From<regression::Error> for Error {
    fn from(e: regression::Error) -> Self {
        Self::Regression(e)
    }
}
