//! Handling of neuron activation functions.

use std::fmt;
use std::str::FromStr;

use nalgebra::DVector;
use num_traits::Float;
use rand::seq::SliceRandom;
use rand::Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config;
use crate::node::Neuron;

/// Represents which activation function to use when calculating neurons.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Activation {
    /// Identity function. Outputs `x`.
    Identity,
    /// Heaviside or unit step function. Outputs `1` for `x > 0`, or `0` otherwise.
    UnitStep,
    /// Sign function. Outputs `1` for `x > 0`, `0` for `x = 0`, or `-1` otherwise.
    Sign,
    /// Logistic function. Outputs `1 / (1 + exp(-x))`.
    Sigmoid,
    /// Hyperbolic tangent function. Outputs `tanh(x)`.
    Tanh,
    /// Softsign function. Outputs `x / (1 + abs(x))`.
    SoftSign,
    /// Bent identity function. Outputs `(sqrt(x^2 + 1) - 1) / 2 + x`.
    BentIdentity,
    /// Rectified linear unit. Outputs `max(x, 0)`.
    Relu,
}

impl Activation {
    /// Every activation function, in declaration order.
    pub const ALL: [Activation; 8] = [
        Activation::Identity,
        Activation::UnitStep,
        Activation::Sign,
        Activation::Sigmoid,
        Activation::Tanh,
        Activation::SoftSign,
        Activation::BentIdentity,
        Activation::Relu,
    ];

    /// Applies the activation function to a single weighted input.
    pub fn apply<T: Float>(&self, x: T) -> T {
        let zero = T::zero();
        let one = T::one();

        match self {
            Activation::Identity => x,
            Activation::UnitStep => {
                if x > zero {
                    one
                } else {
                    zero
                }
            }
            // `signum` maps both zeros to one
            Activation::Sign => {
                if x == zero {
                    zero
                } else {
                    x.signum()
                }
            }
            Activation::Sigmoid => (one + (-x).exp()).recip(),
            Activation::Tanh => x.tanh(),
            Activation::SoftSign => x / (one + x.abs()),
            Activation::BentIdentity => x + ((x * x + one).sqrt() - one) / (one + one),
            Activation::Relu => x.max(zero),
        }
    }

    /// Applies the activation function to every element of `weighted_input`.
    pub fn apply_vector(&self, weighted_input: &DVector<f64>) -> DVector<f64> {
        weighted_input.map(|x| self.apply(x))
    }

    /// Returns the symbolic name of the `Activation`.
    pub fn name(&self) -> &'static str {
        match self {
            Activation::Identity => "identity",
            Activation::UnitStep => "unit_step",
            Activation::Sign => "sign",
            Activation::Sigmoid => "sigmoid",
            Activation::Tanh => "tanh",
            Activation::SoftSign => "soft_sign",
            Activation::BentIdentity => "bent_identity",
            Activation::Relu => "relu",
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Activation {
    type Err = config::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Activation::ALL
            .iter()
            .copied()
            .find(|activation| activation.name() == s)
            .ok_or_else(|| config::Error::UnknownActivation(s.to_string()))
    }
}

/// Applies the activation function named `name` to every element of `weighted_input`.
pub fn calculate_output(
    weighted_input: &DVector<f64>,
    name: &str,
) -> Result<DVector<f64>, config::Error> {
    let activation: Activation = name.parse()?;
    Ok(activation.apply_vector(weighted_input))
}

/// The activation functions eligible for random selection when creating neurons.
///
/// Built once before any network is constructed and only read afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActivationRegistry {
    activations: Vec<Activation>,
}

impl ActivationRegistry {
    /// Returns a registry containing every activation function.
    pub fn all() -> Self {
        Self {
            activations: Activation::ALL.to_vec(),
        }
    }

    /// Returns a registry containing the activation functions with the given names. An empty list
    /// of names results in a registry of every activation function.
    pub fn from_names<I, S>(names: I) -> Result<Self, config::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut activations = Vec::new();

        for name in names {
            let activation: Activation = name.as_ref().parse()?;
            if !activations.contains(&activation) {
                activations.push(activation);
            }
        }

        if activations.is_empty() {
            Ok(Self::all())
        } else {
            Ok(Self { activations })
        }
    }

    /// Returns whether `activation` is registered.
    pub fn contains(&self, activation: Activation) -> bool {
        self.activations.contains(&activation)
    }

    /// Returns the registered activation functions.
    pub fn activations(&self) -> &[Activation] {
        &self.activations
    }

    /// Returns a uniformly random registered activation function.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Activation {
        // Registries are never empty
        *self.activations.choose(rng).unwrap_or(&Activation::Identity)
    }

    /// Returns a new uncalculated, unconnected [`Neuron`]. Uses `activation` if given, or a random
    /// registered activation function otherwise.
    pub fn create_neuron<R: Rng + ?Sized>(
        &self,
        activation: Option<Activation>,
        rng: &mut R,
    ) -> Neuron {
        let activation = activation.unwrap_or_else(|| self.choose(rng));
        Neuron::new(activation)
    }
}

impl Default for ActivationRegistry {
    fn default() -> Self {
        Self::all()
    }
}
