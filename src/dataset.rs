//! Paired input/target data for supervised training.

use crate::error::{Result, TrainingError};

use ndarray::Array2;

/// Input and target rows for supervised training. Row `i` of the inputs is
/// paired with row `i` of the targets.
///
/// Either side may be left unset; trainers refuse to run until both are
/// loaded.
#[derive(Clone, Debug, Default)]
pub struct TrainingSet {
    inputs: Option<Array2<f64>>,
    targets: Option<Array2<f64>>,
}

impl TrainingSet {
    /// Creates a training set from labelled examples, each of the form
    /// `(network input, expected output)`.
    pub fn new<I, O>(examples: &[(I, O)]) -> Result<Self>
    where
        I: AsRef<[f64]>,
        O: AsRef<[f64]>,
    {
        let inputs = stack_rows("input", examples.iter().map(|(i, _)| i.as_ref()))?;
        let targets = stack_rows("target", examples.iter().map(|(_, o)| o.as_ref()))?;
        Ok(TrainingSet::from_arrays(inputs, targets))
    }

    /// Creates a training set from row-major input and target matrices.
    pub fn from_arrays(inputs: Array2<f64>, targets: Array2<f64>) -> Self {
        TrainingSet {
            inputs: Some(inputs),
            targets: Some(targets),
        }
    }

    pub fn set_input_data(&mut self, inputs: Array2<f64>) {
        self.inputs = Some(inputs);
    }

    pub fn set_target_data(&mut self, targets: Array2<f64>) {
        self.targets = Some(targets);
    }

    pub fn input_data(&self) -> Option<&Array2<f64>> {
        self.inputs.as_ref()
    }

    pub fn target_data(&self) -> Option<&Array2<f64>> {
        self.targets.as_ref()
    }

    /// Returns the number of usable rows, or `None` until both sides are
    /// loaded.
    pub fn num_rows(&self) -> Option<usize> {
        match (&self.inputs, &self.targets) {
            (Some(i), Some(t)) => Some(i.nrows().min(t.nrows())),
            _ => None,
        }
    }

    /// Returns the input and target matrices, failing if either is missing.
    pub fn data(&self) -> Result<(&Array2<f64>, &Array2<f64>)> {
        match (&self.inputs, &self.targets) {
            (Some(i), Some(t)) => Ok((i, t)),
            _ => Err(TrainingError::DataNotInitialized),
        }
    }

    /// Checks whatever data is loaded against a network with `input_len`
    /// inputs and `output_len` outputs.
    pub(crate) fn validate(&self, input_len: usize, output_len: usize) -> Result<()> {
        if let Some(inputs) = &self.inputs {
            check_columns("input", inputs, input_len)?;
        }
        if let Some(targets) = &self.targets {
            check_columns("target", targets, output_len)?;
        }
        if let (Some(i), Some(t)) = (&self.inputs, &self.targets) {
            if i.nrows() != t.nrows() {
                return Err(TrainingError::RowMismatch {
                    inputs: i.nrows(),
                    targets: t.nrows(),
                });
            }
        }
        let empty = |data: &Option<Array2<f64>>| data.as_ref().map_or(false, |d| d.nrows() == 0);
        if empty(&self.inputs) || empty(&self.targets) {
            return Err(TrainingError::EmptyTrainingSet);
        }
        Ok(())
    }
}

fn check_columns(which: &'static str, data: &Array2<f64>, expected: usize) -> Result<()> {
    if data.ncols() != expected {
        return Err(TrainingError::ColumnMismatch {
            which,
            expected,
            actual: data.ncols(),
        });
    }
    Ok(())
}

/// Stacks equally sized rows into a row-major matrix.
fn stack_rows<'a, R>(which: &'static str, rows: R) -> Result<Array2<f64>>
where
    R: ExactSizeIterator<Item = &'a [f64]>,
{
    let num_rows = rows.len();
    let mut width = None;
    let mut flat = Vec::new();
    for (row, values) in rows.enumerate() {
        let expected = *width.get_or_insert(values.len());
        if values.len() != expected {
            return Err(TrainingError::RaggedRows {
                which,
                row,
                expected,
                actual: values.len(),
            });
        }
        flat.extend_from_slice(values);
    }
    let shape = (num_rows, width.unwrap_or(0));
    let actual = (flat.len(), 1);
    Array2::from_shape_vec(shape, flat).map_err(|_| TrainingError::ShapeMismatch {
        what: which,
        expected: shape,
        actual,
    })
}
