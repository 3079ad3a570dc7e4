//! Access to the training set.

use crate::config::Error;

/// A training set of named input columns and a target column, all with one value per training
/// instance.
pub trait DataSet {
    /// Returns the names of the input variables, in order.
    fn input_variables(&self) -> Vec<String>;

    /// Returns the values of the input variable `name` if it exists.
    fn input_column(&self, name: &str) -> Option<&[f64]>;

    /// Returns the values of the target variable.
    fn target_variable(&self) -> &[f64];
}

/// An in-memory [`DataSet`].
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnDataSet {
    columns: Vec<(String, Vec<f64>)>,
    target: Vec<f64>,
}

impl ColumnDataSet {
    /// Returns a new `ColumnDataSet` of the named input `columns` and the `target` column.
    ///
    /// There must be at least one training instance and one input column, and every column must
    /// have the same length as `target`.
    pub fn new<S: Into<String>>(
        columns: Vec<(S, Vec<f64>)>,
        target: Vec<f64>,
    ) -> Result<Self, Error> {
        if target.is_empty() {
            return Err(Error::EmptyTrainingSet);
        }
        if columns.is_empty() {
            return Err(Error::NoInputVariables);
        }

        let columns = columns
            .into_iter()
            .map(|(name, values)| {
                let name = name.into();
                if values.len() == target.len() {
                    Ok((name, values))
                } else {
                    Err(Error::ColumnLength {
                        name,
                        expected: target.len(),
                        found: values.len(),
                    })
                }
            })
            .collect::<Result<_, _>>()?;

        Ok(Self { columns, target })
    }

    /// Returns the number of training instances.
    pub fn len(&self) -> usize {
        self.target.len()
    }

    /// Returns whether there are no training instances. Always `false` for a constructed
    /// `ColumnDataSet`.
    pub fn is_empty(&self) -> bool {
        self.target.is_empty()
    }
}

impl DataSet for ColumnDataSet {
    fn input_variables(&self) -> Vec<String> {
        self.columns.iter().map(|(name, _)| name.clone()).collect()
    }

    fn input_column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, values)| values.as_slice())
    }

    fn target_variable(&self) -> &[f64] {
        &self.target
    }
}
