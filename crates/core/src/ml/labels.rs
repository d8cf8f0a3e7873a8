use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// Ordered garment categories for one output head.
///
/// Position in the list is the index the model's head emits a logit for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct LabelSpace {
    labels: Vec<String>,
    positions: HashMap<String, usize>,
}

impl LabelSpace {
    pub fn new(labels: Vec<String>) -> Result<Self, ModelError> {
        if labels.is_empty() {
            return Err(ModelError::InvalidLabelSpace("label space must not be empty".to_string()));
        }

        let mut positions = HashMap::with_capacity(labels.len());
        for (index, label) in labels.iter().enumerate() {
            if positions.insert(label.clone(), index).is_some() {
                return Err(ModelError::InvalidLabelSpace(format!("duplicate label `{label}`")));
            }
        }

        Ok(Self { labels, positions })
    }

    /// Sorted distinct labels, the order a label encoder assigns indices in.
    pub fn fit<I, S>(observed: I) -> Result<Self, ModelError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let distinct: BTreeSet<String> =
            observed.into_iter().map(|label| label.as_ref().to_string()).collect();
        Self::new(distinct.into_iter().collect())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.positions.get(label).copied()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

impl TryFrom<Vec<String>> for LabelSpace {
    type Error = ModelError;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LabelSpace> for Vec<String> {
    fn from(value: LabelSpace) -> Self {
        value.labels
    }
}
