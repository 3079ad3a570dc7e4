use std::{error, fmt};

#[cfg(feature = "json")]
use std::io;

/// An invalid configuration or training set, detected before any network is built.
#[derive(Debug)]
pub enum Error {
    /// No activation function has the given name.
    UnknownActivation(String),
    /// A learning step given by name is not `"optimized"`.
    UnknownLearningStep(String),
    /// A fixed learning step is NaN or infinite.
    NonFiniteLearningStep(f64),
    /// The maximum number of connections is less than one.
    InvalidMaxConnections(usize),
    /// The number of hidden layers is less than one.
    InvalidLayers(usize),
    /// The population size is less than one.
    InvalidPopulationSize(usize),
    /// The training set has no instances.
    EmptyTrainingSet,
    /// The training set has no input variables.
    NoInputVariables,
    /// An input variable listed by the training set has no column.
    MissingColumn(String),
    /// A column does not have one value per training instance.
    ColumnLength {
        /// The name of the column.
        name: String,
        /// The number of training instances.
        expected: usize,
        /// The length of the column.
        found: usize,
    },
    /// The current champion's predictions do not have one value per training instance.
    PredictionLength {
        /// The number of training instances.
        expected: usize,
        /// The length of the champion's predictions.
        found: usize,
    },
    /// An error while deserializing a configuration.
    #[cfg(feature = "json")]
    Serde(serde_json::Error),
    /// An error while reading a configuration file.
    #[cfg(feature = "json")]
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::UnknownActivation(name) => write!(f, "unknown activation function `{}`", name),
            Self::UnknownLearningStep(name) => write!(f, "unknown learning step `{}`", name),
            Self::NonFiniteLearningStep(step) => {
                write!(f, "learning step {} is not finite", step)
            }
            Self::InvalidMaxConnections(n) => {
                write!(f, "max_connections must be at least 1, got {}", n)
            }
            Self::InvalidLayers(n) => write!(f, "layers must be at least 1, got {}", n),
            Self::InvalidPopulationSize(n) => {
                write!(f, "population_size must be at least 1, got {}", n)
            }
            Self::EmptyTrainingSet => write!(f, "training set has no instances"),
            Self::NoInputVariables => write!(f, "training set has no input variables"),
            Self::MissingColumn(name) => write!(f, "no column for input variable `{}`", name),
            Self::ColumnLength {
                name,
                expected,
                found,
            } => write!(
                f,
                "column `{}` has {} values, expected {}",
                name, found, expected
            ),
            Self::PredictionLength { expected, found } => write!(
                f,
                "champion predictions have {} values, expected {}",
                found, expected
            ),
            #[cfg(feature = "json")]
            Self::Serde(e) => write!(f, "deserialization error: {}", e),
            #[cfg(feature = "json")]
            Self::Io(e) => write!(f, "io error: {}", e),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            #[cfg(feature = "json")]
            Self::Serde(e) => Some(e),
            #[cfg(feature = "json")]
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(feature = "json")]
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e)
    }
}

#[cfg(feature = "json")]
impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
